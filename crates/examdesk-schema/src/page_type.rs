//! Page-type schemas
//!
//! A [`PageTypeSchema`] is the declarative description that drives the form
//! for one page type: ordered top-level fields plus ordered section types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::field::FieldDef;
use crate::section::SectionDef;

/// Schema for one page type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTypeSchema {
    /// Page-type key, e.g. `city_page`
    pub key: String,

    /// Human-readable label
    #[serde(default)]
    pub label: String,

    /// Top-level fields in display order
    #[serde(default)]
    pub fields: Vec<FieldDef>,

    /// Section types in display order
    #[serde(default)]
    pub sections: Vec<SectionDef>,
}

impl PageTypeSchema {
    /// Create an empty schema
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            fields: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Append a top-level field
    #[inline]
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a section type
    #[inline]
    #[must_use]
    pub fn with_section(mut self, section: SectionDef) -> Self {
        self.sections.push(section);
        self
    }

    /// Look up a top-level field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a section type
    #[must_use]
    pub fn section(&self, section_type: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.section_type == section_type)
    }

    /// Label to show, falling back to the key
    #[inline]
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// Check structural rules
    ///
    /// # Errors
    /// - blank key or field name
    /// - repeated field name within one list, repeated section type
    /// - array field without item fields, item fields on a non-array field
    /// - array field inside an array item
    /// - top-level field named like a reserved document key
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.key.trim().is_empty() {
            return Err(SchemaError::EmptyKey);
        }

        if let Some(field) = self
            .fields
            .iter()
            .find(|f| RESERVED_FIELD_NAMES.contains(&f.name.as_str()))
        {
            return Err(SchemaError::ReservedFieldName {
                scope: self.key.clone(),
                field: field.name.clone(),
            });
        }
        validate_fields(&self.key, &self.fields, true)?;

        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.section_type.as_str()) {
                return Err(SchemaError::DuplicateSection {
                    scope: self.key.clone(),
                    section: section.section_type.clone(),
                });
            }
            let scope = format!("{}/{}", self.key, section.section_type);
            validate_fields(&scope, &section.fields, true)?;
        }

        Ok(())
    }
}

/// Page document keys that top-level fields may not use
pub const RESERVED_FIELD_NAMES: [&str; 3] = ["id", "page_type", "sections"];

fn validate_fields(scope: &str, fields: &[FieldDef], allow_array: bool) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(SchemaError::EmptyFieldName {
                scope: scope.to_string(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                scope: scope.to_string(),
                field: field.name.clone(),
            });
        }

        if field.kind.is_array() {
            if !allow_array {
                return Err(SchemaError::NestedArray {
                    scope: scope.to_string(),
                    field: field.name.clone(),
                });
            }
            if field.item_fields.is_empty() {
                return Err(SchemaError::EmptyArrayItems {
                    scope: scope.to_string(),
                    field: field.name.clone(),
                });
            }
            let item_scope = format!("{scope}/{}[]", field.name);
            validate_fields(&item_scope, &field.item_fields, false)?;
        } else if !field.item_fields.is_empty() {
            return Err(SchemaError::UnexpectedItemFields {
                scope: scope.to_string(),
                field: field.name.clone(),
                kind: field.kind,
            });
        }
    }
    Ok(())
}
