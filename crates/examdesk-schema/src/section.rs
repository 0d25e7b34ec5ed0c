//! Section definitions

use serde::{Deserialize, Serialize};

use crate::field::FieldDef;

/// A repeatable, typed block of page content
///
/// `section_type` is unique within the owning schema's section list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    /// Section type key
    #[serde(rename = "type")]
    pub section_type: String,

    /// Human-readable label
    #[serde(default)]
    pub label: String,

    /// Fields of each instance
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl SectionDef {
    /// Create a section definition
    #[must_use]
    pub fn new(
        section_type: impl Into<String>,
        label: impl Into<String>,
        fields: Vec<FieldDef>,
    ) -> Self {
        Self {
            section_type: section_type.into(),
            label: label.into(),
            fields,
        }
    }

    /// Label to show, falling back to the type key
    #[inline]
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.section_type
        } else {
            &self.label
        }
    }

    /// Text of the add action, `Add {label}`
    #[must_use]
    pub fn add_action_label(&self) -> String {
        format!("Add {}", self.display_label())
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}
