//! Schema registry
//!
//! Provides [`SchemaRegistry`], the page-type key → [`PageTypeSchema`] lookup
//! used to populate type selectors and to drive form rendering.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::builtin::builtin_schemas;
use crate::error::SchemaError;
use crate::page_type::PageTypeSchema;

static BUILTIN: Lazy<SchemaRegistry> = Lazy::new(|| SchemaRegistry {
    schemas: builtin_schemas()
        .into_iter()
        .map(|schema| (schema.key.clone(), schema))
        .collect(),
});

/// Registry of page-type schemas
///
/// Built once, then read-only. Keys enumerate in registration order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, PageTypeSchema>,
}

impl SchemaRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemas: IndexMap::new(),
        }
    }

    /// Process-wide registry of the built-in page types
    #[must_use]
    pub fn builtin() -> &'static SchemaRegistry {
        &BUILTIN
    }

    /// Build a registry from schemas, validating each
    ///
    /// # Errors
    /// Returns the first invalid schema or duplicate key
    pub fn with_schemas(
        schemas: impl IntoIterator<Item = PageTypeSchema>,
    ) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Register a schema
    ///
    /// # Errors
    /// Returns error if the schema is invalid or its key is taken
    pub fn register(&mut self, schema: PageTypeSchema) -> Result<(), SchemaError> {
        schema.validate()?;
        if self.schemas.contains_key(&schema.key) {
            return Err(SchemaError::DuplicatePageType(schema.key));
        }
        tracing::debug!(
            page_type = %schema.key,
            fields = schema.fields.len(),
            sections = schema.sections.len(),
            "registered page type"
        );
        self.schemas.insert(schema.key.clone(), schema);
        Ok(())
    }

    /// Look up the schema for a page type
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PageTypeSchema> {
        self.schemas.get(key)
    }

    /// Check if a page type is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.schemas.contains_key(key)
    }

    /// All page-type keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// `(key, label)` pairs for a type selector
    #[must_use]
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.schemas
            .values()
            .map(|s| (s.key.as_str(), s.display_label()))
            .collect()
    }

    /// Iterate over all schemas
    pub fn iter(&self) -> impl Iterator<Item = &PageTypeSchema> {
        self.schemas.values()
    }

    /// Get number of registered page types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
