//! Field values
//!
//! Every value in form state is either text or a list of flat array items.
//! Numbers and dates stay text; coercion belongs to whoever consumes the payload.

use examdesk_schema::FieldDef;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One array item: item field name → text value
pub type ArrayItem = IndexMap<String, String>;

/// Value of one field in form state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text value (also used for numbers, dates, files and rich text)
    Text(String),
    /// Items of an array field
    Items(Vec<ArrayItem>),
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl FieldValue {
    /// Text value
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creation-time default for a field: `[]` for arrays, `""` otherwise
    #[must_use]
    pub fn default_for(field: &FieldDef) -> Self {
        if field.kind.is_array() {
            Self::Items(Vec::new())
        } else {
            Self::Text(String::new())
        }
    }

    /// Get text, if this is a text value
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Items(_) => None,
        }
    }

    /// Get items, if this is an item list
    #[inline]
    #[must_use]
    pub fn as_items(&self) -> Option<&[ArrayItem]> {
        match self {
            Self::Text(_) => None,
            Self::Items(items) => Some(items),
        }
    }

    /// Whether the value counts as empty for required-field checks
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Items(items) => items.is_empty(),
        }
    }

    /// Whether the value's shape fits the field kind
    #[inline]
    #[must_use]
    pub fn fits(&self, field: &FieldDef) -> bool {
        field.kind.is_array() == matches!(self, Self::Items(_))
    }

    /// Lenient conversion from a fetched record value
    ///
    /// Strings are kept, numbers and booleans stringified, `null` becomes
    /// `""`, arrays become items, objects are kept as their JSON text.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Array(elements) => Self::Items(
                elements
                    .iter()
                    .filter_map(|element| match element {
                        JsonValue::Object(map) => Some(
                            map.iter()
                                .map(|(key, v)| (key.clone(), json_to_text(v)))
                                .collect(),
                        ),
                        other => {
                            tracing::warn!(value = %other, "skipping non-object array item");
                            None
                        }
                    })
                    .collect(),
            ),
            other => Self::Text(json_to_text(other)),
        }
    }

    /// Payload representation
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Text(text) => JsonValue::String(text.clone()),
            Self::Items(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| {
                        JsonValue::Object(
                            item.iter()
                                .map(|(k, v)| (k.clone(), JsonValue::String(v.clone())))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<ArrayItem>> for FieldValue {
    fn from(items: Vec<ArrayItem>) -> Self {
        Self::Items(items)
    }
}

/// Blank item for an array field: every item field set to `""`
#[must_use]
pub fn blank_item(field: &FieldDef) -> ArrayItem {
    field
        .item_fields
        .iter()
        .map(|sub| (sub.name.clone(), String::new()))
        .collect()
}

/// Default values for a field list, keyed by field name
#[must_use]
pub fn default_values(fields: &[FieldDef]) -> IndexMap<String, FieldValue> {
    fields
        .iter()
        .map(|field| (field.name.clone(), FieldValue::default_for(field)))
        .collect()
}

fn json_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examdesk_schema::FieldKind;
    use serde_json::json;

    #[test]
    fn defaults_by_kind() {
        for kind in FieldKind::ALL {
            let field = FieldDef::new("f", kind, "F");
            let value = FieldValue::default_for(&field);
            if kind == FieldKind::Array {
                assert_eq!(value, FieldValue::Items(vec![]));
            } else {
                assert_eq!(value, FieldValue::text(""));
            }
            assert!(value.is_blank());
            assert!(value.fits(&field));
        }
    }

    #[test]
    fn blank_item_has_every_item_field() {
        let field = FieldDef::array(
            "rows",
            "Rows",
            vec![FieldDef::text("a", "A"), FieldDef::number("b", "B")],
        );
        let item = blank_item(&field);
        assert_eq!(item.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(item.values().all(String::is_empty));
    }

    #[test]
    fn from_json_is_lenient() {
        assert_eq!(FieldValue::from_json(&json!("x")), FieldValue::text("x"));
        assert_eq!(FieldValue::from_json(&json!(42)), FieldValue::text("42"));
        assert_eq!(FieldValue::from_json(&json!(true)), FieldValue::text("true"));
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::text(""));
        assert_eq!(
            FieldValue::from_json(&json!({"blocks": []})),
            FieldValue::text(r#"{"blocks":[]}"#)
        );

        let items = FieldValue::from_json(&json!([{"q": "Why?", "rank": 2}, "stray", {"q": null}]));
        let items = items.as_items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["rank"], "2");
        assert_eq!(items[1]["q"], "");
    }

    #[test]
    fn to_json_keeps_strings() {
        let mut item = ArrayItem::new();
        item.insert("amount".into(), "12.5".into());
        let value = FieldValue::Items(vec![item]);
        assert_eq!(value.to_json(), json!([{ "amount": "12.5" }]));
    }

    #[test]
    fn whitespace_text_is_blank() {
        assert!(FieldValue::text("  ").is_blank());
        assert!(!FieldValue::text("a").is_blank());
    }
}
