//! Field definitions
//!
//! Provides [`FieldKind`] and [`FieldDef`], the declarative description of a
//! single editable value at page level, inside a section, or inside an array item.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of an editable field
///
/// Schema documents carry the kind as a lowercase string. Unknown strings
/// fall back to [`FieldKind::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    /// Single-line text
    #[default]
    Text,
    /// Multi-line text
    Textarea,
    /// Rich-text block, stored as an opaque serialized string
    Editor,
    /// ISO `YYYY-MM-DD` date
    Date,
    /// Numeric input, string-typed in form state
    Number,
    /// File reference, set from an upload result
    File,
    /// Repeatable list of flat item objects
    Array,
}

impl FieldKind {
    /// All kinds in declaration order
    pub const ALL: [FieldKind; 7] = [
        FieldKind::Text,
        FieldKind::Textarea,
        FieldKind::Editor,
        FieldKind::Date,
        FieldKind::Number,
        FieldKind::File,
        FieldKind::Array,
    ];

    /// Wire name of this kind
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Editor => "editor",
            Self::Date => "date",
            Self::Number => "number",
            Self::File => "file",
            Self::Array => "array",
        }
    }

    /// Whether values of this kind are item lists
    #[inline]
    #[must_use]
    pub fn is_array(self) -> bool {
        matches!(self, Self::Array)
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "textarea" => Self::Textarea,
            "editor" => Self::Editor,
            "date" => Self::Date,
            "number" => Self::Number,
            "file" => Self::File,
            "array" => Self::Array,
            _ => Self::Text,
        })
    }
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A named, typed editable value
///
/// `name` is unique within the owning field list. When `kind` is
/// [`FieldKind::Array`], `item_fields` describes each item; item fields are
/// flat (see [`crate::PageTypeSchema::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    /// Key in the owning value map
    pub name: String,

    /// Field kind
    #[serde(rename = "type", default)]
    pub kind: FieldKind,

    /// Human-readable label
    #[serde(default)]
    pub label: String,

    /// Whether the owning screen requires a value
    #[serde(default)]
    pub required: bool,

    /// Shape of each array item
    #[serde(default, alias = "item_fields", skip_serializing_if = "Vec::is_empty")]
    pub item_fields: Vec<FieldDef>,
}

impl FieldDef {
    /// Create a field of the given kind
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            label: label.into(),
            required: false,
            item_fields: Vec::new(),
        }
    }

    /// Single-line text field
    #[inline]
    #[must_use]
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, label)
    }

    /// Multi-line text field
    #[inline]
    #[must_use]
    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Textarea, label)
    }

    /// Rich-text field
    #[inline]
    #[must_use]
    pub fn editor(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Editor, label)
    }

    /// Date field
    #[inline]
    #[must_use]
    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date, label)
    }

    /// Number field
    #[inline]
    #[must_use]
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number, label)
    }

    /// File field
    #[inline]
    #[must_use]
    pub fn file(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, FieldKind::File, label)
    }

    /// Array field with the given item shape
    #[must_use]
    pub fn array(
        name: impl Into<String>,
        label: impl Into<String>,
        item_fields: Vec<FieldDef>,
    ) -> Self {
        Self {
            item_fields,
            ..Self::new(name, FieldKind::Array, label)
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Label to show, falling back to the name
    #[inline]
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }

    /// Look up an item field by name
    #[must_use]
    pub fn item_field(&self, name: &str) -> Option<&FieldDef> {
        self.item_fields.iter().find(|f| f.name == name)
    }
}
