//! Field paths
//!
//! Provides [`FieldPath`] for addressing one editable value inside a
//! [`crate::FormData`].

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::FormError;

/// Address of one editable value
///
/// # Examples
/// - `title` → page field
/// - `sections[0].heading` → field of the first section instance
/// - `sections[0].bullets[1].text` → field of an array item inside a section
/// - `faqs[2].answer` → field of an array item at page level
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
    /// Top-level page field
    Page {
        /// Field name
        field: String,
    },
    /// Field of a section instance
    Section {
        /// Position in `sections`
        index: usize,
        /// Field name
        field: String,
    },
    /// Field of an array item; `parent` addresses the array field
    Item {
        /// Path of the owning array field
        parent: Box<FieldPath>,
        /// Item position
        index: usize,
        /// Item field name
        field: String,
    },
}

impl FieldPath {
    /// Path of a page field
    #[inline]
    #[must_use]
    pub fn page(field: impl Into<String>) -> Self {
        Self::Page {
            field: field.into(),
        }
    }

    /// Path of a section field
    #[inline]
    #[must_use]
    pub fn section(index: usize, field: impl Into<String>) -> Self {
        Self::Section {
            index,
            field: field.into(),
        }
    }

    /// Path of a field of item `index` of the array field at `self`
    #[inline]
    #[must_use]
    pub fn item(&self, index: usize, field: impl Into<String>) -> Self {
        Self::Item {
            parent: Box::new(self.clone()),
            index,
            field: field.into(),
        }
    }

    /// Name of the addressed field
    #[inline]
    #[must_use]
    pub fn field_name(&self) -> &str {
        match self {
            Self::Page { field } | Self::Section { field, .. } | Self::Item { field, .. } => field,
        }
    }

    /// Section index this path lives in, if any
    #[must_use]
    pub fn section_index(&self) -> Option<usize> {
        match self {
            Self::Page { .. } => None,
            Self::Section { index, .. } => Some(*index),
            Self::Item { parent, .. } => parent.section_index(),
        }
    }

    /// Check if this path addresses an array item field
    #[inline]
    #[must_use]
    pub fn is_item(&self) -> bool {
        matches!(self, Self::Item { .. })
    }

    /// Where this path points after section `removed` is taken out
    ///
    /// `None` if it lived in the removed section; later sections move down by one.
    #[must_use]
    pub fn after_section_removed(&self, removed: usize) -> Option<Self> {
        match self {
            Self::Page { .. } => Some(self.clone()),
            Self::Section { index, field } => match (*index).cmp(&removed) {
                Ordering::Less => Some(self.clone()),
                Ordering::Equal => None,
                Ordering::Greater => Some(Self::section(index - 1, field.clone())),
            },
            Self::Item {
                parent,
                index,
                field,
            } => parent
                .after_section_removed(removed)
                .map(|parent| parent.item(*index, field.clone())),
        }
    }

    /// Where this path points after item `removed` of the array at `array` is taken out
    ///
    /// `None` if it lived in the removed item; later items move down by one.
    #[must_use]
    pub fn after_item_removed(&self, array: &FieldPath, removed: usize) -> Option<Self> {
        match self {
            Self::Item {
                parent,
                index,
                field,
            } if parent.as_ref() == array => match (*index).cmp(&removed) {
                Ordering::Less => Some(self.clone()),
                Ordering::Equal => None,
                Ordering::Greater => Some(array.item(index - 1, field.clone())),
            },
            _ => Some(self.clone()),
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page { field } => write!(f, "{field}"),
            Self::Section { index, field } => write!(f, "sections[{index}].{field}"),
            Self::Item {
                parent,
                index,
                field,
            } => write!(f, "{parent}[{index}].{field}"),
        }
    }
}

fn parse_segment(segment: &str) -> Option<(&str, Option<usize>)> {
    match segment.split_once('[') {
        None => (!segment.is_empty()).then_some((segment, None)),
        Some((name, rest)) => {
            let index = rest.strip_suffix(']')?.parse().ok()?;
            (!name.is_empty()).then_some((name, Some(index)))
        }
    }
}

impl FromStr for FieldPath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FormError::InvalidPath(s.to_string());
        let segments = s
            .split('.')
            .map(parse_segment)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        match segments.as_slice() {
            [("sections", Some(index)), (field, None)] => Ok(Self::section(*index, *field)),
            [("sections", Some(index)), (field, Some(item)), (sub, None)] => {
                Ok(Self::section(*index, *field).item(*item, *sub))
            }
            [(field, None)] => Ok(Self::page(*field)),
            [(field, Some(item)), (sub, None)] => Ok(Self::page(*field).item(*item, *sub)),
            _ => Err(invalid()),
        }
    }
}
