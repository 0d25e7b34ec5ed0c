//! Error types for schema construction and loading

use std::path::PathBuf;

use crate::field::FieldKind;

/// Schema error type
///
/// `scope` names where the problem sits, e.g. `city_page`,
/// `city_page/hero` or `city_page/faq/items[]`.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Page-type key is blank
    #[error("page type key must not be empty")]
    EmptyKey,

    /// Same page type registered twice
    #[error("duplicate page type `{0}`")]
    DuplicatePageType(String),

    /// Field name repeated within one field list
    #[error("{scope}: duplicate field `{field}`")]
    DuplicateField { scope: String, field: String },

    /// Section type repeated within one schema
    #[error("{scope}: duplicate section type `{section}`")]
    DuplicateSection { scope: String, section: String },

    /// Field name is blank
    #[error("{scope}: field name must not be empty")]
    EmptyFieldName { scope: String },

    /// Top-level field named like a record key the page document reserves
    #[error("{scope}: field name `{field}` is reserved")]
    ReservedFieldName { scope: String, field: String },

    /// Array field without item shape
    #[error("{scope}: array field `{field}` has no item fields")]
    EmptyArrayItems { scope: String, field: String },

    /// Non-array field carrying an item shape
    #[error("{scope}: field `{field}` of type {kind} cannot declare item fields")]
    UnexpectedItemFields {
        scope: String,
        field: String,
        kind: FieldKind,
    },

    /// Array nested inside an array item
    #[error("{scope}: item field `{field}` cannot be an array")]
    NestedArray { scope: String, field: String },

    /// JSON document failed to parse
    #[error("invalid JSON schema document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// YAML document failed to parse
    #[error("invalid YAML schema document: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// TOML document failed to parse
    #[error("invalid TOML schema document: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// File extension not recognised
    #[error("unsupported schema document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Reading a schema document failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Whether the error comes from a malformed schema rather than I/O or parsing
    #[inline]
    #[must_use]
    pub fn is_definition_error(&self) -> bool {
        !matches!(
            self,
            Self::InvalidJson(_)
                | Self::InvalidYaml(_)
                | Self::InvalidToml(_)
                | Self::UnsupportedFormat(_)
                | Self::Io { .. }
        )
    }
}
