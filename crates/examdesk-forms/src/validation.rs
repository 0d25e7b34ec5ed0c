//! Required-field and format validation
//!
//! Run by the editor on submit; the renderer never validates on its own.
//! Fields of sections that have no instance are not checked.

use std::fmt;

use chrono::NaiveDate;
use examdesk_schema::{FieldDef, FieldKind, PageTypeSchema};
use serde::Serialize;

use crate::form_data::FormData;
use crate::path::FieldPath;
use crate::value::{ArrayItem, FieldValue};

/// ISO date format accepted by date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What is wrong with one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Required value is blank, or a required array has no items
    Missing,
    /// Date value is not `YYYY-MM-DD`
    InvalidDate,
    /// Number value does not parse
    InvalidNumber,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Offending value
    #[serde(serialize_with = "serialize_path")]
    pub path: FieldPath,
    /// Field label for messages
    pub label: String,
    /// Finding
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Missing => write!(f, "{} is required ({})", self.label, self.path),
            IssueKind::InvalidDate => {
                write!(f, "{} must be a date like 2024-01-31 ({})", self.label, self.path)
            }
            IssueKind::InvalidNumber => write!(f, "{} must be a number ({})", self.label, self.path),
        }
    }
}

/// All findings of one validation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Findings in schema order
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl ValidationReport {
    /// Whether nothing was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of findings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Findings for one path
    pub fn for_path<'a>(&'a self, path: &'a FieldPath) -> impl Iterator<Item = &'a ValidationIssue> + 'a {
        self.issues.iter().filter(move |issue| &issue.path == path)
    }

    fn push(&mut self, path: FieldPath, field: &FieldDef, kind: IssueKind) {
        self.issues.push(ValidationIssue {
            path,
            label: field.display_label().to_string(),
            kind,
        });
    }
}

/// Validate `form` against `schema`
///
/// # Errors
/// Returns the full report if any finding exists
pub fn validate(schema: &PageTypeSchema, form: &FormData) -> Result<(), ValidationReport> {
    let mut report = ValidationReport::default();

    for field in &schema.fields {
        check_field(&mut report, field, form.field(&field.name), FieldPath::page(&field.name));
    }

    for (index, instance) in form.sections.iter().enumerate() {
        // unregistered section types carry no rules
        let Some(def) = schema.section(&instance.section_type) else {
            continue;
        };
        for field in &def.fields {
            check_field(
                &mut report,
                field,
                instance.value(&field.name),
                FieldPath::section(index, &field.name),
            );
        }
    }

    if report.is_empty() {
        Ok(())
    } else {
        tracing::debug!(issues = report.len(), page_type = %schema.key, "validation failed");
        Err(report)
    }
}

fn check_field(
    report: &mut ValidationReport,
    field: &FieldDef,
    value: Option<&FieldValue>,
    path: FieldPath,
) {
    if field.kind.is_array() {
        let items = value.and_then(FieldValue::as_items).unwrap_or_default();
        if field.required && items.is_empty() {
            report.push(path.clone(), field, IssueKind::Missing);
        }
        for (index, item) in items.iter().enumerate() {
            check_item(report, field, &path, index, item);
        }
        return;
    }

    let text = value.and_then(FieldValue::as_text).unwrap_or_default();
    check_text(report, field, text, path);
}

fn check_item(
    report: &mut ValidationReport,
    field: &FieldDef,
    parent: &FieldPath,
    index: usize,
    item: &ArrayItem,
) {
    for sub in &field.item_fields {
        let text = item.get(&sub.name).map_or("", String::as_str);
        check_text(report, sub, text, parent.item(index, &sub.name));
    }
}

fn check_text(report: &mut ValidationReport, field: &FieldDef, text: &str, path: FieldPath) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        if field.required {
            report.push(path, field, IssueKind::Missing);
        }
        return;
    }

    match field.kind {
        FieldKind::Date if NaiveDate::parse_from_str(trimmed, DATE_FORMAT).is_err() => {
            report.push(path, field, IssueKind::InvalidDate);
        }
        FieldKind::Number if !is_number(trimmed) => {
            report.push(path, field, IssueKind::InvalidNumber);
        }
        _ => {}
    }
}

fn is_number(text: &str) -> bool {
    text.parse::<f64>().is_ok_and(f64::is_finite)
}

fn serialize_path<S: serde::Serializer>(path: &FieldPath, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(path)
}
