//! examdesk Form Engine
//!
//! Turns a [`PageTypeSchema`](examdesk_schema::PageTypeSchema) into an
//! editable form and keeps the in-memory page document consistent while it
//! is edited.
//!
//! # Core Concepts
//!
//! - [`FormData`]: top-level values plus ordered [`SectionInstance`]s
//! - [`render`] / [`FormRenderer`]: schema + state → [`RenderOutcome`], and
//!   the edit handlers (top-level writes go through `on_change`, sections are
//!   replace-on-write)
//! - [`ArrayFieldControl`]: stateless list editor for `array` fields
//! - [`UploadCoordinator`]: per-field upload state machine
//! - [`PageEditor`]: one open editor session, from hydrate to submit
//!
//! # Example
//!
//! ```rust
//! use examdesk_forms::{render, FormData, RenderOutcome, UploadStates};
//! use examdesk_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builtin();
//! let form = FormData::new();
//! let outcome = render(registry, Some("city_page"), &form, &UploadStates::new());
//! let RenderOutcome::Form(view) = outcome else { panic!("schema exists") };
//! assert_eq!(view.fields[0].name, "title");
//! assert!(view.sections.iter().all(|s| !s.is_present()));
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod array_field;
mod control;
mod editor;
mod error;
mod form_data;
mod path;
mod renderer;
mod upload;
mod validation;
mod value;

// Re-exports
pub use array_field::{ArrayEdit, ArrayFieldControl};
pub use control::{Control, FieldView, ItemView};
pub use editor::{PageEditor, PageStore, SavedPage, StoreError};
pub use error::FormError;
pub use form_data::{FormData, SectionInstance, RESERVED_KEYS};
pub use path::FieldPath;
pub use renderer::{render, FormRenderer, FormView, RenderOutcome, SectionView, SELECT_TYPE_TEXT};
pub use upload::{
    LogNotifier, Notification, NotificationLevel, Notifier, UploadCompletion, UploadCoordinator,
    UploadError, UploadFile, UploadState, UploadStates, UploadTask, UploadedFile, Uploader,
};
pub use validation::{validate, IssueKind, ValidationIssue, ValidationReport, DATE_FORMAT};
pub use value::{blank_item, default_values, ArrayItem, FieldValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
