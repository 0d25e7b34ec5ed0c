//! Form state
//!
//! [`FormData`] is the document an open editor mutates: top-level values plus
//! an ordered list of [`SectionInstance`]s. It is created empty or hydrated
//! from a fetched record, and submitted wholesale as a payload.

use examdesk_schema::SectionDef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::FormError;
use crate::path::FieldPath;
use crate::value::{default_values, FieldValue};

/// Record keys that never become top-level form fields
pub const RESERVED_KEYS: [&str; 3] = examdesk_schema::RESERVED_FIELD_NAMES;

/// One occurrence of a section type
///
/// `order` is user-editable and only used for display; it is never renumbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionInstance {
    /// Section type key
    #[serde(rename = "type")]
    pub section_type: String,

    /// Display order
    pub order: i64,

    /// Field values of this occurrence
    #[serde(default)]
    pub content: IndexMap<String, FieldValue>,
}

impl SectionInstance {
    /// New instance with every field of `def` at its default
    #[must_use]
    pub fn from_def(def: &SectionDef, order: i64) -> Self {
        Self {
            section_type: def.section_type.clone(),
            order,
            content: default_values(&def.fields),
        }
    }

    /// Get a content value
    #[inline]
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.content.get(field)
    }

    fn to_json(&self) -> JsonValue {
        let content = self
            .content
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<Map<_, _>>();
        serde_json::json!({
            "type": self.section_type,
            "order": self.order,
            "content": content,
        })
    }
}

/// Document being edited
///
/// Serializes with top-level values flattened next to `sections`; reading a
/// record back goes through [`FormData::hydrate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormData {
    /// Top-level values
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldValue>,

    /// Section instances in position order
    pub sections: Vec<SectionInstance>,
}

impl FormData {
    /// Create empty form state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrate from a fetched record
    ///
    /// Reserved keys (`id`, `page_type`, `sections`) are not copied into
    /// `fields`. Section entries without a `type` are skipped; a missing or
    /// unparsable `order` falls back to the entry's position.
    ///
    /// # Errors
    /// Returns error if the record is not an object or `sections` is not an array
    pub fn hydrate(record: &JsonValue) -> Result<Self, FormError> {
        let object = record
            .as_object()
            .ok_or_else(|| FormError::InvalidRecord("expected an object".to_string()))?;

        let fields = object
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), FieldValue::from_json(value)))
            .collect();

        let sections = match object.get("sections") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(entries)) => entries
                .iter()
                .enumerate()
                .filter_map(|(position, entry)| hydrate_section(position, entry))
                .collect(),
            Some(_) => {
                return Err(FormError::InvalidRecord(
                    "`sections` must be an array".to_string(),
                ))
            }
        };

        Ok(Self { fields, sections })
    }

    /// Get a top-level value
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Set a top-level value in place
    #[inline]
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Copy with one top-level value replaced
    #[must_use]
    pub fn with_field(&self, name: impl Into<String>, value: FieldValue) -> Self {
        let mut next = self.clone();
        next.set_field(name, value);
        next
    }

    /// Position of the first instance of a section type
    #[must_use]
    pub fn section_index(&self, section_type: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.section_type == section_type)
    }

    /// Get a section instance by position
    ///
    /// # Errors
    /// Returns error if `index` is out of range
    pub fn section(&self, index: usize) -> Result<&SectionInstance, FormError> {
        self.sections
            .get(index)
            .ok_or(FormError::SectionIndexOutOfRange {
                index,
                len: self.sections.len(),
            })
    }

    fn section_mut(&mut self, index: usize) -> Result<&mut SectionInstance, FormError> {
        let len = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(FormError::SectionIndexOutOfRange { index, len })
    }

    /// Resolve the value a page or section path points at
    ///
    /// Item paths resolve through [`FormData::text_at`].
    #[must_use]
    pub fn value_at(&self, path: &FieldPath) -> Option<&FieldValue> {
        match path {
            FieldPath::Page { field } => self.fields.get(field),
            FieldPath::Section { index, field } => self.sections.get(*index)?.content.get(field),
            FieldPath::Item { .. } => None,
        }
    }

    /// Text stored at a path
    #[must_use]
    pub fn text_at(&self, path: &FieldPath) -> Option<&str> {
        match path {
            FieldPath::Item {
                parent,
                index,
                field,
            } => self
                .value_at(parent)?
                .as_items()?
                .get(*index)?
                .get(field)
                .map(String::as_str),
            other => self.value_at(other)?.as_text(),
        }
    }

    /// Store text at a path, in place
    ///
    /// # Errors
    /// - section or item index out of range
    /// - item path whose parent is not an array value
    /// - item path nested inside another item path
    pub fn set_text(&mut self, path: &FieldPath, text: String) -> Result<(), FormError> {
        match path {
            FieldPath::Page { field } => {
                self.fields.insert(field.clone(), FieldValue::Text(text));
            }
            FieldPath::Section { index, field } => {
                self.section_mut(*index)?
                    .content
                    .insert(field.clone(), FieldValue::Text(text));
            }
            FieldPath::Item {
                parent,
                index,
                field,
            } => {
                let container = match parent.as_ref() {
                    FieldPath::Page { field } => self.fields.get_mut(field),
                    FieldPath::Section { index, field } => {
                        self.section_mut(*index)?.content.get_mut(field)
                    }
                    FieldPath::Item { .. } => {
                        return Err(FormError::InvalidPath(path.to_string()));
                    }
                };
                let Some(FieldValue::Items(items)) = container else {
                    return Err(FormError::NotAnArrayField(parent.to_string()));
                };
                let len = items.len();
                let item = items
                    .get_mut(*index)
                    .ok_or_else(|| FormError::ItemIndexOutOfRange {
                        field: parent.field_name().to_string(),
                        index: *index,
                        len,
                    })?;
                item.insert(field.clone(), text);
            }
        }
        Ok(())
    }

    /// Wholesale submit payload
    ///
    /// `{ "page_type": ..., <top-level fields>, "sections": [...] }`; values
    /// stay strings.
    #[must_use]
    pub fn to_payload(&self, page_type: Option<&str>) -> JsonValue {
        let mut payload = Map::new();
        if let Some(page_type) = page_type {
            payload.insert("page_type".to_string(), JsonValue::String(page_type.to_string()));
        }
        for (name, value) in &self.fields {
            payload.insert(name.clone(), value.to_json());
        }
        payload.insert(
            "sections".to_string(),
            JsonValue::Array(self.sections.iter().map(SectionInstance::to_json).collect()),
        );
        JsonValue::Object(payload)
    }
}

fn hydrate_section(position: usize, entry: &JsonValue) -> Option<SectionInstance> {
    let Some(section_type) = entry.get("type").and_then(JsonValue::as_str) else {
        tracing::warn!(position, "skipping section without a type");
        return None;
    };

    let fallback = i64::try_from(position).unwrap_or(i64::MAX);
    let order = match entry.get("order") {
        Some(JsonValue::Number(n)) => n.as_i64().unwrap_or(fallback),
        Some(JsonValue::String(s)) => s.trim().parse().unwrap_or(fallback),
        _ => fallback,
    };

    let content = entry
        .get("content")
        .and_then(JsonValue::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                .collect()
        })
        .unwrap_or_default();

    Some(SectionInstance {
        section_type: section_type.to_string(),
        order,
        content,
    })
}
