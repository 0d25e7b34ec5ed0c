//! Array-field control
//!
//! [`ArrayFieldControl`] is a pure function of the current value and an
//! `on_change` callback: it never keeps its own copy of the items. Every
//! successful operation builds the full new item list and hands it to
//! `on_change` exactly once; a failed operation does not call it at all.

use examdesk_schema::FieldDef;

use crate::error::FormError;
use crate::value::{blank_item, ArrayItem, FieldValue};

/// One edit of an array field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayEdit {
    /// Append a blank item
    Add,
    /// Set one item field of one item
    Update {
        /// Item position
        index: usize,
        /// Item field name
        field: String,
        /// New text
        value: String,
    },
    /// Remove one item by position
    Remove {
        /// Item position
        index: usize,
    },
}

impl ArrayEdit {
    /// Update edit
    #[inline]
    #[must_use]
    pub fn update(index: usize, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Update {
            index,
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Editor over one array field's current items
#[derive(Debug, Clone, Copy)]
pub struct ArrayFieldControl<'a> {
    field: &'a FieldDef,
    items: &'a [ArrayItem],
}

impl<'a> ArrayFieldControl<'a> {
    /// Bind to an array field and its current value
    ///
    /// A missing value or a text value (e.g. a record that stored `null`)
    /// counts as no items, the same way the repeater renders it. The first
    /// successful edit replaces the text with an item list.
    ///
    /// # Errors
    /// Returns error if `field` is not an array field
    pub fn new(field: &'a FieldDef, value: Option<&'a FieldValue>) -> Result<Self, FormError> {
        if !field.kind.is_array() {
            return Err(FormError::NotAnArrayField(field.name.clone()));
        }
        let items: &'a [ArrayItem] = match value {
            Some(FieldValue::Items(items)) => items.as_slice(),
            Some(FieldValue::Text(text)) => {
                if !text.trim().is_empty() {
                    tracing::warn!(field = %field.name, "array field held text; editing from no items");
                }
                &[]
            }
            None => &[],
        };
        Ok(Self { field, items })
    }

    /// Current items
    #[inline]
    #[must_use]
    pub fn items(&self) -> &'a [ArrayItem] {
        self.items
    }

    /// Append an item with every item field set to `""`
    pub fn add_item(&self, on_change: impl FnOnce(&str, FieldValue)) {
        let mut items = self.items.to_vec();
        items.push(blank_item(self.field));
        on_change(&self.field.name, FieldValue::Items(items));
    }

    /// Shallow-merge `sub_field = value` into item `index`
    ///
    /// # Errors
    /// Returns error if `index` is out of range or `sub_field` is not an item field
    pub fn update_item(
        &self,
        index: usize,
        sub_field: &str,
        value: impl Into<String>,
        on_change: impl FnOnce(&str, FieldValue),
    ) -> Result<(), FormError> {
        self.check_index(index)?;
        if self.field.item_field(sub_field).is_none() {
            return Err(FormError::UnknownItemField {
                field: self.field.name.clone(),
                item_field: sub_field.to_string(),
            });
        }

        let mut items = self.items.to_vec();
        items[index].insert(sub_field.to_string(), value.into());
        on_change(&self.field.name, FieldValue::Items(items));
        Ok(())
    }

    /// Remove item `index`; later items shift down by one
    ///
    /// # Errors
    /// Returns error if `index` is out of range
    pub fn remove_item(
        &self,
        index: usize,
        on_change: impl FnOnce(&str, FieldValue),
    ) -> Result<(), FormError> {
        self.check_index(index)?;
        let mut items = self.items.to_vec();
        items.remove(index);
        on_change(&self.field.name, FieldValue::Items(items));
        Ok(())
    }

    /// Apply one edit
    ///
    /// # Errors
    /// Same as the individual operations
    pub fn apply(
        &self,
        edit: ArrayEdit,
        on_change: impl FnOnce(&str, FieldValue),
    ) -> Result<(), FormError> {
        match edit {
            ArrayEdit::Add => {
                self.add_item(on_change);
                Ok(())
            }
            ArrayEdit::Update {
                index,
                field,
                value,
            } => self.update_item(index, &field, value, on_change),
            ArrayEdit::Remove { index } => self.remove_item(index, on_change),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(FormError::ItemIndexOutOfRange {
                field: self.field.name.clone(),
                index,
                len: self.items.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq_field() -> FieldDef {
        FieldDef::array(
            "faqs",
            "FAQ",
            vec![FieldDef::text("a", "A"), FieldDef::text("b", "B")],
        )
    }

    #[test]
    fn rejects_non_array_field() {
        let field = FieldDef::text("title", "Title");
        assert!(matches!(
            ArrayFieldControl::new(&field, None),
            Err(FormError::NotAnArrayField(_))
        ));
    }

    #[test]
    fn text_value_counts_as_no_items() {
        let field = faq_field();
        for value in [FieldValue::text(""), FieldValue::text("legacy")] {
            let control = ArrayFieldControl::new(&field, Some(&value)).unwrap();
            assert!(control.items().is_empty());
            assert!(matches!(
                control.remove_item(0, |_, _| panic!("no callback on error")),
                Err(FormError::ItemIndexOutOfRange { index: 0, len: 0, .. })
            ));

            let mut out = None;
            control.add_item(|_, v| out = Some(v));
            assert_eq!(out.unwrap().as_items().map(<[_]>::len), Some(1));
        }
    }

    #[test]
    fn add_on_missing_value() {
        let field = faq_field();
        let control = ArrayFieldControl::new(&field, None).unwrap();
        let mut seen = Vec::new();
        control.add_item(|name, value| seen.push((name.to_string(), value)));

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "faqs");
        let items = seen[0].1.as_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["a"], "");
        assert_eq!(items[0]["b"], "");
    }

    #[test]
    fn failed_ops_do_not_call_back() {
        let field = faq_field();
        let value = FieldValue::Items(vec![blank_item(&field)]);
        let control = ArrayFieldControl::new(&field, Some(&value)).unwrap();
        let mut calls = 0;

        assert!(control.update_item(1, "a", "x", |_, _| calls += 1).is_err());
        assert!(control.update_item(0, "zzz", "x", |_, _| calls += 1).is_err());
        assert!(control.remove_item(3, |_, _| calls += 1).is_err());
        assert_eq!(calls, 0);
    }

    #[test]
    fn apply_dispatches() {
        let field = faq_field();
        let value = FieldValue::Items(vec![blank_item(&field), blank_item(&field)]);
        let control = ArrayFieldControl::new(&field, Some(&value)).unwrap();

        let mut out = None;
        control
            .apply(ArrayEdit::update(1, "b", "yes"), |_, v| out = Some(v))
            .unwrap();
        let items = out.unwrap();
        let items = items.as_items().unwrap();
        assert_eq!(items[0]["b"], "");
        assert_eq!(items[1]["b"], "yes");

        let mut out = None;
        control
            .apply(ArrayEdit::Remove { index: 0 }, |_, v| out = Some(v))
            .unwrap();
        assert_eq!(out.unwrap().as_items().map(<[_]>::len), Some(1));
    }
}
