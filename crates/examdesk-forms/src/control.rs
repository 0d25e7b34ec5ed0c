//! Field-type rendering policy
//!
//! Maps a [`FieldDef`] and its current value to the [`Control`] that edits
//! it. The mapping is total over [`FieldKind`]; a missing or mis-shaped value
//! renders as `""` (or no items for arrays).

use examdesk_schema::{FieldDef, FieldKind};
use serde::Serialize;

use crate::path::FieldPath;
use crate::upload::UploadStates;
use crate::value::{ArrayItem, FieldValue};

/// Editable control for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    /// Single-line text input
    TextInput {
        /// Current text
        value: String,
    },
    /// Multi-line text input
    TextArea {
        /// Current text
        value: String,
    },
    /// Rich-text block; the value is opaque to the form engine
    RichText {
        /// Serialized editor content
        value: String,
    },
    /// Date picker over an ISO date string
    DatePicker {
        /// `YYYY-MM-DD` or `""`
        value: String,
    },
    /// Numeric input; the value stays a string
    NumberInput {
        /// Current text
        value: String,
    },
    /// File select with async upload
    FileSelect {
        /// Stored server filename
        value: String,
        /// Local preview while an upload runs
        preview_url: Option<String>,
        /// Busy indicator; the select is disabled while set
        busy: bool,
    },
    /// Repeatable item editor
    Repeater {
        /// Current items
        items: Vec<ItemView>,
    },
}

impl Control {
    /// Pick and fill the control for `field`
    #[must_use]
    pub fn for_field(
        field: &FieldDef,
        value: Option<&FieldValue>,
        path: &FieldPath,
        uploads: &UploadStates,
    ) -> Self {
        let text = value
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string();

        match field.kind {
            FieldKind::Text => Self::TextInput { value: text },
            FieldKind::Textarea => Self::TextArea { value: text },
            FieldKind::Editor => Self::RichText { value: text },
            FieldKind::Date => Self::DatePicker { value: text },
            FieldKind::Number => Self::NumberInput { value: text },
            FieldKind::File => {
                let state = uploads.state(path);
                Self::FileSelect {
                    value: text,
                    preview_url: state.preview_url().map(str::to_string),
                    busy: state.is_busy(),
                }
            }
            FieldKind::Array => {
                let items = value.and_then(FieldValue::as_items).unwrap_or_default();
                Self::Repeater {
                    items: items
                        .iter()
                        .enumerate()
                        .map(|(index, item)| ItemView::new(field, path, index, item, uploads))
                        .collect(),
                }
            }
        }
    }

    /// Visible text of a scalar control
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::TextInput { value }
            | Self::TextArea { value }
            | Self::RichText { value }
            | Self::DatePicker { value }
            | Self::NumberInput { value }
            | Self::FileSelect { value, .. } => Some(value),
            Self::Repeater { .. } => None,
        }
    }

    /// Items of a repeater
    #[must_use]
    pub fn items(&self) -> Option<&[ItemView]> {
        match self {
            Self::Repeater { items } => Some(items),
            _ => None,
        }
    }

    /// Whether input is blocked
    #[inline]
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::FileSelect { busy: true, .. })
    }
}

/// One rendered field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    /// Where edits to this field go
    #[serde(serialize_with = "serialize_path")]
    pub path: FieldPath,
    /// Field name
    pub name: String,
    /// Label to show
    pub label: String,
    /// Required marker
    pub required: bool,
    /// Control and current value
    #[serde(flatten)]
    pub control: Control,
}

impl FieldView {
    /// Render one field
    #[must_use]
    pub fn new(
        field: &FieldDef,
        value: Option<&FieldValue>,
        path: FieldPath,
        uploads: &UploadStates,
    ) -> Self {
        let control = Control::for_field(field, value, &path, uploads);
        Self {
            path,
            name: field.name.clone(),
            label: field.display_label().to_string(),
            required: field.required,
            control,
        }
    }
}

/// One rendered array item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemView {
    /// Item position
    pub index: usize,
    /// One view per item field, in item-field order
    pub fields: Vec<FieldView>,
}

impl ItemView {
    fn new(
        field: &FieldDef,
        path: &FieldPath,
        index: usize,
        item: &ArrayItem,
        uploads: &UploadStates,
    ) -> Self {
        let fields = field
            .item_fields
            .iter()
            .map(|sub| {
                let value = item.get(&sub.name).map(|text| FieldValue::text(text.as_str()));
                FieldView::new(sub, value.as_ref(), path.item(index, &sub.name), uploads)
            })
            .collect();
        Self { index, fields }
    }
}

fn serialize_path<S: serde::Serializer>(path: &FieldPath, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(path)
}
