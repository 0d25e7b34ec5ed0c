//! examdesk Schema System
//!
//! Declarative page-type schemas that drive the dashboard's dynamic forms.
//!
//! # Core Concepts
//!
//! - [`FieldDef`]: a named, typed editable value ([`FieldKind`] is a closed set)
//! - [`SectionDef`]: a repeatable block type with its own field list
//! - [`PageTypeSchema`]: top-level fields plus section types for one page type
//! - [`SchemaRegistry`]: immutable page-type key → schema lookup
//!
//! # Example
//!
//! ```rust
//! use examdesk_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builtin();
//! let schema = registry.get("city_page").expect("built-in page type");
//! assert!(schema.section("faq").is_some());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod builtin;
mod document;
mod error;
mod field;
mod page_type;
mod registry;
mod section;

// Re-exports
pub use document::{DocumentFormat, SchemaDocument};
pub use error::SchemaError;
pub use field::{FieldDef, FieldKind};
pub use page_type::{PageTypeSchema, RESERVED_FIELD_NAMES};
pub use registry::SchemaRegistry;
pub use section::SectionDef;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
