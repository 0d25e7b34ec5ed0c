//! examdesk API collaborators
//!
//! `reqwest` implementations of the form engine's [`Uploader`] and
//! [`PageStore`] seams against the content backend.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use examdesk_api::{ApiClient, ApiConfig, HttpPageStore, HttpUploader};
//! use examdesk_forms::{LogNotifier, PageEditor};
//! use examdesk_schema::SchemaRegistry;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiConfig::new("https://cms.example.org/api").with_token("secret"))?;
//! let mut editor = PageEditor::new(
//!     SchemaRegistry::builtin(),
//!     Arc::new(HttpUploader::new(client.clone())),
//!     Arc::new(LogNotifier),
//! );
//! editor.select_page_type("city_page");
//! editor.set_field("title", "Study in Leeds")?;
//! editor.submit(&HttpPageStore::new(client)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Uploader`]: examdesk_forms::Uploader
//! [`PageStore`]: examdesk_forms::PageStore

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod store;
mod uploader;

// Re-exports
pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::ApiError;
pub use store::{HttpPageStore, PAGES_PATH};
pub use uploader::{HttpUploader, UPLOAD_PATH};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
