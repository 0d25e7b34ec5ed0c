//! Schema documents
//!
//! Loads a [`SchemaRegistry`] from a JSON, YAML or TOML document of the form
//! `{ page_types: [ ... ] }`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::page_type::PageTypeSchema;
use crate::registry::SchemaRegistry;

/// Serialized set of page-type schemas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Page types in registration order
    #[serde(default, alias = "pageTypes")]
    pub page_types: Vec<PageTypeSchema>,
}

/// Supported document encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl DocumentFormat {
    /// Pick the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parse a document in this format
    ///
    /// # Errors
    /// Returns error if the text is not a valid document
    pub fn parse(self, text: &str) -> Result<SchemaDocument, SchemaError> {
        Ok(match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
            Self::Toml => toml::from_str(text)?,
        })
    }
}

impl SchemaDocument {
    /// Build a validated registry from this document
    ///
    /// # Errors
    /// Returns the first invalid schema or duplicate key
    pub fn into_registry(self) -> Result<SchemaRegistry, SchemaError> {
        SchemaRegistry::with_schemas(self.page_types)
    }
}

impl SchemaRegistry {
    /// Parse a JSON schema document
    ///
    /// # Errors
    /// Returns error on malformed JSON or invalid schemas
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        DocumentFormat::Json.parse(json)?.into_registry()
    }

    /// Parse a YAML schema document
    ///
    /// # Errors
    /// Returns error on malformed YAML or invalid schemas
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        DocumentFormat::Yaml.parse(yaml)?.into_registry()
    }

    /// Parse a TOML schema document
    ///
    /// # Errors
    /// Returns error on malformed TOML or invalid schemas
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        DocumentFormat::Toml.parse(text)?.into_registry()
    }

    /// Load a schema document, choosing the format by extension
    ///
    /// # Errors
    /// Returns error if the file cannot be read, has an unknown extension,
    /// or holds an invalid document
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| SchemaError::UnsupportedFormat(path.to_path_buf()))?;
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = format.parse(&text)?.into_registry()?;
        tracing::info!(path = %path.display(), page_types = registry.len(), "loaded schema document");
        Ok(registry)
    }

    /// Snapshot this registry as a document
    #[must_use]
    pub fn to_document(&self) -> SchemaDocument {
        SchemaDocument {
            page_types: self.iter().cloned().collect(),
        }
    }
}
