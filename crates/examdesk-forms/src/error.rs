//! Error types for form editing
//!
//! Errors are terminal at the field or section they concern; none of them
//! leaves a [`crate::FormData`] half-updated.

use examdesk_schema::FieldKind;

use crate::editor::StoreError;
use crate::path::FieldPath;
use crate::validation::ValidationReport;

/// Main form error type
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// No page type chosen yet
    #[error("no page type selected")]
    NoPageType,

    /// Page type has no registered schema
    #[error("no schema found for page type `{0}`")]
    UnknownPageType(String),

    /// Field not declared by the schema
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// Section type not declared by the schema
    #[error("unknown section type `{0}`")]
    UnknownSection(String),

    /// "Add" on a section type that already has an instance
    #[error("section `{0}` already present")]
    SectionAlreadyPresent(String),

    /// Section position out of range
    #[error("section index {index} out of range (len {len})")]
    SectionIndexOutOfRange { index: usize, len: usize },

    /// Array item position out of range
    #[error("item index {index} out of range for `{field}` (len {len})")]
    ItemIndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    /// Item field not declared by the array field
    #[error("`{field}` items have no field `{item_field}`")]
    UnknownItemField { field: String, item_field: String },

    /// Value shape does not fit the field kind
    #[error("value for `{field}` does not fit a {expected} field")]
    KindMismatch { field: String, expected: FieldKind },

    /// Array operation on a non-array field
    #[error("`{0}` is not an array field")]
    NotAnArrayField(String),

    /// Malformed or unresolvable field path
    #[error("invalid field path `{0}`")]
    InvalidPath(String),

    /// Upload already running for this field
    #[error("upload already in progress for `{0}`")]
    UploadInProgress(FieldPath),

    /// Submit attempted while uploads are running
    #[error("{0} upload(s) still in progress")]
    UploadsPending(usize),

    /// Fetched record could not be hydrated
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Required-field or format validation failed
    #[error("validation failed: {0}")]
    Invalid(#[from] ValidationReport),

    /// Page store rejected the payload
    #[error("save failed: {0}")]
    Store(#[from] StoreError),
}

impl FormError {
    /// Check if the error came from the caller's input rather than the backend
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}
