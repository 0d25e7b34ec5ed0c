//! Dynamic form renderer
//!
//! Renders a [`PageTypeSchema`] against a [`FormData`] and handles edits.
//!
//! Storage is split on purpose:
//! - top-level fields are written through a caller-supplied `on_change`;
//!   the owning editor merges the value into its own state
//! - section content is managed here: every section handler returns a new
//!   [`FormData`] and leaves the input untouched

use examdesk_schema::{FieldDef, PageTypeSchema, SchemaRegistry, SectionDef};
use serde::Serialize;

use crate::array_field::{ArrayEdit, ArrayFieldControl};
use crate::control::FieldView;
use crate::error::FormError;
use crate::form_data::{FormData, SectionInstance};
use crate::path::FieldPath;
use crate::upload::UploadStates;
use crate::value::FieldValue;

/// Placeholder text when no page type is chosen
pub const SELECT_TYPE_TEXT: &str = "Please select a page type to edit its fields.";

/// Result of rendering a page form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// No page type chosen yet
    NoTypeSelected,
    /// Page type chosen but not registered
    SchemaMissing {
        /// The unknown key
        page_type: String,
    },
    /// Editable form
    Form(FormView),
}

impl RenderOutcome {
    /// Placeholder text for the two empty states
    #[must_use]
    pub fn placeholder(&self) -> Option<String> {
        match self {
            Self::NoTypeSelected => Some(SELECT_TYPE_TEXT.to_string()),
            Self::SchemaMissing { page_type } => {
                Some(format!("No schema found for page type `{page_type}`."))
            }
            Self::Form(_) => None,
        }
    }

    /// Rendered form, if any
    #[inline]
    #[must_use]
    pub fn form(&self) -> Option<&FormView> {
        match self {
            Self::Form(view) => Some(view),
            _ => None,
        }
    }
}

/// Rendered page form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormView {
    /// Page-type key
    pub page_type: String,
    /// Page-type label
    pub label: String,
    /// Top-level fields in schema order
    pub fields: Vec<FieldView>,
    /// One entry per section type in schema order
    pub sections: Vec<SectionView>,
}

impl FormView {
    /// Find a rendered top-level field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Find the entry for a section type
    #[must_use]
    pub fn section(&self, section_type: &str) -> Option<&SectionView> {
        self.sections
            .iter()
            .find(|s| s.section_type() == section_type)
    }
}

/// Rendered section slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SectionView {
    /// No instance yet: only the add action
    Absent {
        /// Section type key
        section_type: String,
        /// `Add {label}`
        add_label: String,
    },
    /// Existing instance
    Present {
        /// Section type key
        section_type: String,
        /// Section label
        label: String,
        /// Position in `sections`
        index: usize,
        /// Current order value
        order: i64,
        /// One view per section field
        fields: Vec<FieldView>,
    },
}

impl SectionView {
    /// Section type key
    #[must_use]
    pub fn section_type(&self) -> &str {
        match self {
            Self::Absent { section_type, .. } | Self::Present { section_type, .. } => section_type,
        }
    }

    /// Whether an instance exists
    #[inline]
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Rendered fields of a present section
    #[must_use]
    pub fn fields(&self) -> &[FieldView] {
        match self {
            Self::Absent { .. } => &[],
            Self::Present { fields, .. } => fields,
        }
    }
}

/// Render the form for `page_type`
///
/// A missing or blank `page_type` renders [`RenderOutcome::NoTypeSelected`];
/// an unregistered one renders [`RenderOutcome::SchemaMissing`].
#[must_use]
pub fn render(
    registry: &SchemaRegistry,
    page_type: Option<&str>,
    form: &FormData,
    uploads: &UploadStates,
) -> RenderOutcome {
    let Some(key) = page_type.map(str::trim).filter(|k| !k.is_empty()) else {
        return RenderOutcome::NoTypeSelected;
    };
    match registry.get(key) {
        Some(schema) => RenderOutcome::Form(FormRenderer::new(schema).view(form, uploads)),
        None => RenderOutcome::SchemaMissing {
            page_type: key.to_string(),
        },
    }
}

/// Renderer bound to one schema
#[derive(Debug, Clone, Copy)]
pub struct FormRenderer<'s> {
    schema: &'s PageTypeSchema,
}

impl<'s> FormRenderer<'s> {
    /// Bind to a schema
    #[inline]
    #[must_use]
    pub fn new(schema: &'s PageTypeSchema) -> Self {
        Self { schema }
    }

    /// Look up a page type and bind to it
    ///
    /// # Errors
    /// Returns error if no page type is given or it is not registered
    pub fn for_page_type(
        registry: &'s SchemaRegistry,
        page_type: Option<&str>,
    ) -> Result<Self, FormError> {
        let key = page_type
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(FormError::NoPageType)?;
        registry
            .get(key)
            .map(Self::new)
            .ok_or_else(|| FormError::UnknownPageType(key.to_string()))
    }

    /// Bound schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &'s PageTypeSchema {
        self.schema
    }

    /// Build the view of `form`
    #[must_use]
    pub fn view(&self, form: &FormData, uploads: &UploadStates) -> FormView {
        let fields = self
            .schema
            .fields
            .iter()
            .map(|field| {
                FieldView::new(
                    field,
                    form.field(&field.name),
                    FieldPath::page(&field.name),
                    uploads,
                )
            })
            .collect();

        let sections = self
            .schema
            .sections
            .iter()
            .map(|def| section_view(def, form, uploads))
            .collect();

        FormView {
            page_type: self.schema.key.clone(),
            label: self.schema.display_label().to_string(),
            fields,
            sections,
        }
    }

    // -- top-level fields: write-through --------------------------------------

    fn page_field(&self, name: &str) -> Result<&'s FieldDef, FormError> {
        self.schema
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Route a top-level edit to `on_change`
    ///
    /// # Errors
    /// Returns error if the field is unknown or the value's shape does not fit
    pub fn edit_field(
        &self,
        name: &str,
        value: FieldValue,
        on_change: impl FnOnce(&str, FieldValue),
    ) -> Result<(), FormError> {
        let field = self.page_field(name)?;
        if !value.fits(field) {
            return Err(FormError::KindMismatch {
                field: name.to_string(),
                expected: field.kind,
            });
        }
        on_change(&field.name, value);
        Ok(())
    }

    /// Route a top-level array edit to `on_change`
    ///
    /// # Errors
    /// Returns error if the field is unknown, not an array, or the edit is out of range
    pub fn edit_array_field(
        &self,
        form: &FormData,
        name: &str,
        edit: ArrayEdit,
        on_change: impl FnOnce(&str, FieldValue),
    ) -> Result<(), FormError> {
        let field = self.page_field(name)?;
        ArrayFieldControl::new(field, form.field(name))?.apply(edit, on_change)
    }

    // -- sections: managed here, replace-on-write -----------------------------

    fn section_def(&self, section_type: &str) -> Result<&'s SectionDef, FormError> {
        self.schema
            .section(section_type)
            .ok_or_else(|| FormError::UnknownSection(section_type.to_string()))
    }

    /// Add an instance of `section_type`
    ///
    /// The new instance gets `order = sections.len()` and default content.
    ///
    /// # Errors
    /// Returns error if the type is unknown or an instance already exists
    pub fn add_section(&self, form: &FormData, section_type: &str) -> Result<FormData, FormError> {
        let def = self.section_def(section_type)?;
        if form.section_index(section_type).is_some() {
            return Err(FormError::SectionAlreadyPresent(section_type.to_string()));
        }

        let order = i64::try_from(form.sections.len()).unwrap_or(i64::MAX);
        let mut next = form.clone();
        next.sections.push(SectionInstance::from_def(def, order));
        tracing::debug!(section = section_type, order, "section added");
        Ok(next)
    }

    /// Set one instance's order; siblings are not renumbered
    ///
    /// # Errors
    /// Returns error if `index` is out of range
    pub fn set_section_order(
        &self,
        form: &FormData,
        index: usize,
        order: i64,
    ) -> Result<FormData, FormError> {
        form.section(index)?;
        let mut next = form.clone();
        next.sections[index].order = order;
        Ok(next)
    }

    /// Remove the instance at `index`; later instances shift down by one
    ///
    /// # Errors
    /// Returns error if `index` is out of range
    pub fn remove_section(&self, form: &FormData, index: usize) -> Result<FormData, FormError> {
        let removed = form.section(index)?;
        tracing::debug!(section = %removed.section_type, index, "section removed");
        let mut next = form.clone();
        next.sections.remove(index);
        Ok(next)
    }

    /// Write `content[field]` of the instance at `index`
    ///
    /// # Errors
    /// Returns error if `index` is out of range, the instance's type or the
    /// field is unknown, or the value's shape does not fit
    pub fn update_section_field(
        &self,
        form: &FormData,
        index: usize,
        field: &str,
        value: FieldValue,
    ) -> Result<FormData, FormError> {
        let def = self.section_field(form, index, field)?;
        if !value.fits(def) {
            return Err(FormError::KindMismatch {
                field: field.to_string(),
                expected: def.kind,
            });
        }

        let mut next = form.clone();
        next.sections[index].content.insert(def.name.clone(), value);
        Ok(next)
    }

    /// Apply an array edit to a section's array field
    ///
    /// # Errors
    /// Same as [`FormRenderer::update_section_field`], plus array edit errors
    pub fn edit_section_array(
        &self,
        form: &FormData,
        index: usize,
        field: &str,
        edit: ArrayEdit,
    ) -> Result<FormData, FormError> {
        let def = self.section_field(form, index, field)?;
        let current = form.sections[index].value(field);

        let mut changed = None;
        ArrayFieldControl::new(def, current)?.apply(edit, |_, items| changed = Some(items))?;
        match changed {
            Some(items) => self.update_section_field(form, index, field, items),
            None => Ok(form.clone()),
        }
    }

    fn section_field(
        &self,
        form: &FormData,
        index: usize,
        field: &str,
    ) -> Result<&'s FieldDef, FormError> {
        let instance = form.section(index)?;
        self.section_def(&instance.section_type)?
            .field(field)
            .ok_or_else(|| FormError::UnknownField(format!("{}.{field}", instance.section_type)))
    }
}

fn section_view(def: &SectionDef, form: &FormData, uploads: &UploadStates) -> SectionView {
    let Some(index) = form.section_index(&def.section_type) else {
        return SectionView::Absent {
            section_type: def.section_type.clone(),
            add_label: def.add_action_label(),
        };
    };

    let instance = &form.sections[index];
    let fields = def
        .fields
        .iter()
        .map(|field| {
            FieldView::new(
                field,
                instance.value(&field.name),
                FieldPath::section(index, &field.name),
                uploads,
            )
        })
        .collect();

    SectionView::Present {
        section_type: def.section_type.clone(),
        label: def.display_label().to_string(),
        index,
        order: instance.order,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examdesk_schema::FieldDef;

    fn schema() -> PageTypeSchema {
        PageTypeSchema::new("landing", "Landing")
            .with_field(FieldDef::text("title", "Title").required())
            .with_field(FieldDef::array("faqs", "FAQ", vec![FieldDef::text("q", "Q")]))
            .with_section(SectionDef::new(
                "hero",
                "Hero",
                vec![FieldDef::text("heading", "Heading"), FieldDef::file("bg", "Background")],
            ))
            .with_section(SectionDef::new("cta", "Call to Action", vec![FieldDef::text("label", "Label")]))
    }

    #[test]
    fn edit_field_writes_through_only() {
        let schema = schema();
        let renderer = FormRenderer::new(&schema);
        let mut got = None;
        renderer
            .edit_field("title", FieldValue::text("Hello"), |name, value| {
                got = Some((name.to_string(), value));
            })
            .unwrap();
        assert_eq!(got, Some(("title".to_string(), FieldValue::text("Hello"))));
    }

    #[test]
    fn edit_field_rejects_unknown_and_mis_shaped() {
        let schema = schema();
        let renderer = FormRenderer::new(&schema);
        let mut calls = 0;
        assert!(matches!(
            renderer.edit_field("nope", FieldValue::text("x"), |_, _| calls += 1),
            Err(FormError::UnknownField(_))
        ));
        assert!(matches!(
            renderer.edit_field("faqs", FieldValue::text("x"), |_, _| calls += 1),
            Err(FormError::KindMismatch { .. })
        ));
        assert_eq!(calls, 0);
    }

    #[test]
    fn add_section_twice_rejected() {
        let schema = schema();
        let renderer = FormRenderer::new(&schema);
        let form = renderer.add_section(&FormData::new(), "hero").unwrap();
        assert!(matches!(
            renderer.add_section(&form, "hero"),
            Err(FormError::SectionAlreadyPresent(_))
        ));
        assert!(matches!(
            renderer.add_section(&form, "footer"),
            Err(FormError::UnknownSection(_))
        ));
    }

    #[test]
    fn view_marks_present_and_absent_sections() {
        let schema = schema();
        let renderer = FormRenderer::new(&schema);
        let form = renderer.add_section(&FormData::new(), "cta").unwrap();
        let view = renderer.view(&form, &UploadStates::new());

        assert!(!view.section("hero").unwrap().is_present());
        assert!(matches!(
            view.section("hero"),
            Some(SectionView::Absent { add_label, .. }) if add_label == "Add Hero"
        ));
        let cta = view.section("cta").unwrap();
        assert!(cta.is_present());
        assert_eq!(cta.fields()[0].path.to_string(), "sections[0].label");
    }

    #[test]
    fn update_section_field_checks_field() {
        let schema = schema();
        let renderer = FormRenderer::new(&schema);
        let form = renderer.add_section(&FormData::new(), "hero").unwrap();
        assert!(matches!(
            renderer.update_section_field(&form, 0, "label", FieldValue::text("x")),
            Err(FormError::UnknownField(ref f)) if f == "hero.label"
        ));
        assert!(matches!(
            renderer.update_section_field(&form, 1, "heading", FieldValue::text("x")),
            Err(FormError::SectionIndexOutOfRange { index: 1, len: 1 })
        ));
    }

    #[test]
    fn section_of_unregistered_type_cannot_be_edited() {
        let schema = schema();
        let renderer = FormRenderer::new(&schema);
        let mut form = FormData::new();
        form.sections.push(SectionInstance {
            section_type: "legacy".into(),
            order: 0,
            content: indexmap::IndexMap::new(),
        });
        assert!(matches!(
            renderer.update_section_field(&form, 0, "x", FieldValue::text("y")),
            Err(FormError::UnknownSection(_))
        ));
        // still removable
        assert!(renderer.remove_section(&form, 0).unwrap().sections.is_empty());
    }

    #[test]
    fn for_page_type_errors() {
        let registry = SchemaRegistry::with_schemas(vec![schema()]).unwrap();
        assert!(matches!(FormRenderer::for_page_type(&registry, None), Err(FormError::NoPageType)));
        assert!(matches!(
            FormRenderer::for_page_type(&registry, Some(" ")),
            Err(FormError::NoPageType)
        ));
        assert!(matches!(
            FormRenderer::for_page_type(&registry, Some("blog")),
            Err(FormError::UnknownPageType(_))
        ));
        assert!(FormRenderer::for_page_type(&registry, Some("landing")).is_ok());
    }
}
