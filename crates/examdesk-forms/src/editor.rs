//! Page editor session
//!
//! A [`PageEditor`] lives as long as one open editor screen. It owns the
//! form state, the chosen page type and the upload states, merges top-level
//! writes coming back from the renderer, and submits the finished page
//! through a [`PageStore`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use examdesk_schema::{FieldDef, FieldKind, PageTypeSchema, SchemaRegistry};
use serde_json::Value as JsonValue;

use crate::array_field::ArrayEdit;
use crate::error::FormError;
use crate::form_data::FormData;
use crate::path::FieldPath;
use crate::renderer::{render, FormRenderer, RenderOutcome};
use crate::upload::{
    Notification, Notifier, UploadCompletion, UploadCoordinator, UploadFile, UploadState,
    UploadTask, Uploader,
};
use crate::validation::validate;
use crate::value::FieldValue;

/// Identity of a saved page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    /// Backend record id
    pub id: String,
}

impl SavedPage {
    /// Create saved page id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Page store failure, shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    /// Human-readable reason
    pub message: String,
}

impl StoreError {
    /// Create store error
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Backend that persists whole page payloads
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Create a new page
    async fn create(&self, payload: JsonValue) -> Result<SavedPage, StoreError>;

    /// Replace an existing page
    async fn update(&self, id: &str, payload: JsonValue) -> Result<SavedPage, StoreError>;
}

/// One open page editor
pub struct PageEditor<'r> {
    registry: &'r SchemaRegistry,
    page_type: Option<String>,
    record_id: Option<String>,
    form: FormData,
    uploads: UploadCoordinator,
}

impl fmt::Debug for PageEditor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageEditor")
            .field("page_type", &self.page_type)
            .field("record_id", &self.record_id)
            .field("form", &self.form)
            .field("uploads", &self.uploads)
            .finish_non_exhaustive()
    }
}

impl<'r> PageEditor<'r> {
    /// Open an empty editor for a new page
    #[must_use]
    pub fn new(
        registry: &'r SchemaRegistry,
        uploader: Arc<dyn Uploader>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            page_type: None,
            record_id: None,
            form: FormData::new(),
            uploads: UploadCoordinator::new(uploader, notifier),
        }
    }

    /// Hydrate from a fetched record
    ///
    /// `page_type` wins over the record's own `page_type`; `id` is kept for
    /// the update call on submit. Previous form and upload states are dropped.
    ///
    /// # Errors
    /// Returns error if the record cannot be hydrated; the editor is left unchanged
    pub fn open(&mut self, page_type: Option<&str>, record: &JsonValue) -> Result<(), FormError> {
        let form = FormData::hydrate(record)?;

        self.page_type = page_type
            .map(str::to_string)
            .or_else(|| record.get("page_type").and_then(JsonValue::as_str).map(str::to_string))
            .filter(|key| !key.trim().is_empty());
        self.record_id = record.get("id").and_then(record_id);
        self.form = form;
        self.uploads.reset();

        tracing::info!(
            page_type = self.page_type.as_deref().unwrap_or("-"),
            record_id = self.record_id.as_deref().unwrap_or("-"),
            sections = self.form.sections.len(),
            "editor opened"
        );
        Ok(())
    }

    /// Choose the page type; the form state is kept
    pub fn select_page_type(&mut self, key: impl Into<String>) {
        let key = key.into();
        tracing::debug!(page_type = %key, "page type selected");
        self.page_type = Some(key).filter(|k| !k.trim().is_empty());
    }

    /// Chosen page type
    #[inline]
    #[must_use]
    pub fn page_type(&self) -> Option<&str> {
        self.page_type.as_deref()
    }

    /// Id of the record being edited, if it was saved before
    #[inline]
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Current form state
    #[inline]
    #[must_use]
    pub fn form(&self) -> &FormData {
        &self.form
    }

    /// Upload state of one field
    #[inline]
    #[must_use]
    pub fn upload_state(&self, path: &FieldPath) -> &UploadState {
        self.uploads.state(path)
    }

    /// Schema of the chosen page type
    ///
    /// # Errors
    /// Returns error if no page type is chosen or it is not registered
    pub fn schema(&self) -> Result<&'r PageTypeSchema, FormError> {
        self.renderer().map(|r| r.schema())
    }

    fn renderer(&self) -> Result<FormRenderer<'r>, FormError> {
        FormRenderer::for_page_type(self.registry, self.page_type.as_deref())
    }

    /// Render the current state
    #[must_use]
    pub fn render(&self) -> RenderOutcome {
        render(
            self.registry,
            self.page_type.as_deref(),
            &self.form,
            self.uploads.states(),
        )
    }

    // -- edits ----------------------------------------------------------------

    /// Set a top-level field
    ///
    /// # Errors
    /// Returns error if there is no schema, the field is unknown, or the value does not fit
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FormError> {
        let renderer = self.renderer()?;
        let form = &mut self.form;
        renderer.edit_field(name, value.into(), |name, value| form.set_field(name, value))
    }

    /// Edit a top-level array field
    ///
    /// # Errors
    /// Returns error if there is no schema or the edit is rejected
    pub fn edit_array(&mut self, name: &str, edit: ArrayEdit) -> Result<(), FormError> {
        let renderer = self.renderer()?;
        let removed = removed_item(&edit);
        let mut changed = None;
        renderer.edit_array_field(&self.form, name, edit, |name, value| {
            changed = Some((name.to_string(), value));
        })?;
        if let Some((name, value)) = changed {
            self.form.set_field(name, value);
        }
        if let Some(index) = removed {
            self.uploads.item_removed(&FieldPath::page(name), index);
        }
        Ok(())
    }

    /// Add an instance of a section type
    ///
    /// # Errors
    /// See [`FormRenderer::add_section`]
    pub fn add_section(&mut self, section_type: &str) -> Result<(), FormError> {
        self.form = self.renderer()?.add_section(&self.form, section_type)?;
        Ok(())
    }

    /// Set a section's order value
    ///
    /// # Errors
    /// See [`FormRenderer::set_section_order`]
    pub fn set_section_order(&mut self, index: usize, order: i64) -> Result<(), FormError> {
        self.form = self.renderer()?.set_section_order(&self.form, index, order)?;
        Ok(())
    }

    /// Remove a section instance
    ///
    /// Upload states of later sections move down with them; an upload still
    /// running in the removed section finishes as a failure.
    ///
    /// # Errors
    /// See [`FormRenderer::remove_section`]
    pub fn remove_section(&mut self, index: usize) -> Result<(), FormError> {
        self.form = self.renderer()?.remove_section(&self.form, index)?;
        self.uploads.section_removed(index);
        Ok(())
    }

    /// Set a field of a section instance
    ///
    /// # Errors
    /// See [`FormRenderer::update_section_field`]
    pub fn set_section_field(
        &mut self,
        index: usize,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), FormError> {
        self.form = self
            .renderer()?
            .update_section_field(&self.form, index, field, value.into())?;
        Ok(())
    }

    /// Edit an array field of a section instance
    ///
    /// # Errors
    /// See [`FormRenderer::edit_section_array`]
    pub fn edit_section_array(
        &mut self,
        index: usize,
        field: &str,
        edit: ArrayEdit,
    ) -> Result<(), FormError> {
        let removed = removed_item(&edit);
        self.form = self
            .renderer()?
            .edit_section_array(&self.form, index, field, edit)?;
        if let Some(item) = removed {
            self.uploads.item_removed(&FieldPath::section(index, field), item);
        }
        Ok(())
    }

    // -- uploads --------------------------------------------------------------

    /// Schema field a path points at
    ///
    /// # Errors
    /// Returns error if there is no schema or the path does not resolve
    pub fn field_at(&self, path: &FieldPath) -> Result<&'r FieldDef, FormError> {
        let schema = self.schema()?;
        resolve_field(schema, &self.form, path)
    }

    /// Start uploading `file` into the file field at `path`
    ///
    /// The form stays editable while the returned task runs; feed its result
    /// to [`PageEditor::finish_upload`].
    ///
    /// # Errors
    /// Returns error if the path is not a file field or that field is already uploading
    pub fn begin_upload(&mut self, path: FieldPath, file: UploadFile) -> Result<UploadTask, FormError> {
        require_file_field(self.schema()?, &self.form, &path)?;
        self.uploads.begin(path, file)
    }

    /// Apply a finished upload to the current form state
    ///
    /// The filename is only stored if the upload's field still exists and is
    /// still a file field; otherwise the upload counts as failed.
    pub fn finish_upload(&mut self, completion: UploadCompletion) {
        let schema = self.schema().ok();
        let form = &self.form;
        let next = self.uploads.finish_checked(form, completion, |path| {
            let schema = schema.ok_or(FormError::NoPageType)?;
            require_file_field(schema, form, path)
        });
        self.form = next;
    }

    /// Begin, run and finish one upload
    ///
    /// # Errors
    /// Same as [`PageEditor::begin_upload`]; collaborator failures are
    /// reported through the notifier instead
    pub async fn upload(&mut self, path: FieldPath, file: UploadFile) -> Result<(), FormError> {
        let task = self.begin_upload(path, file)?;
        let completion = task.run().await;
        self.finish_upload(completion);
        Ok(())
    }

    // -- submit ---------------------------------------------------------------

    /// Validate the current state against the chosen schema
    ///
    /// # Errors
    /// Returns [`FormError::Invalid`] with every finding, or a schema lookup error
    pub fn validate(&self) -> Result<(), FormError> {
        validate(self.schema()?, &self.form)?;
        Ok(())
    }

    /// Wholesale payload of the current state
    #[must_use]
    pub fn payload(&self) -> JsonValue {
        self.form.to_payload(self.page_type.as_deref())
    }

    /// Validate and save through `store`
    ///
    /// Creates the page on first save and updates it afterwards. Every
    /// failure is also sent to the notifier.
    ///
    /// # Errors
    /// - [`FormError::UploadsPending`] while any upload is running
    /// - [`FormError::Invalid`] if validation fails
    /// - [`FormError::Store`] if the store rejects the payload
    pub async fn submit(&mut self, store: &dyn PageStore) -> Result<SavedPage, FormError> {
        if let Err(e) = self.check_submittable() {
            self.notify(Notification::error(e.to_string()));
            return Err(e);
        }

        let payload = self.payload();
        let result = match self.record_id.as_deref() {
            Some(id) => store.update(id, payload).await,
            None => store.create(payload).await,
        };

        match result {
            Ok(saved) => {
                let verb = if self.record_id.is_some() { "updated" } else { "created" };
                tracing::info!(id = %saved.id, verb, "page saved");
                self.notify(Notification::info(format!("Page {verb}")));
                self.record_id = Some(saved.id.clone());
                Ok(saved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "page save failed");
                self.notify(Notification::error(format!("Save failed: {e}")));
                Err(FormError::Store(e))
            }
        }
    }

    fn check_submittable(&self) -> Result<(), FormError> {
        let busy = self.uploads.states().busy_count();
        if busy > 0 {
            return Err(FormError::UploadsPending(busy));
        }
        self.validate()
    }

    fn notify(&self, notification: Notification) {
        self.uploads.notifier().notify(notification);
    }
}

fn record_id(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn removed_item(edit: &ArrayEdit) -> Option<usize> {
    match edit {
        ArrayEdit::Remove { index } => Some(*index),
        ArrayEdit::Add | ArrayEdit::Update { .. } => None,
    }
}

fn require_file_field(
    schema: &PageTypeSchema,
    form: &FormData,
    path: &FieldPath,
) -> Result<(), FormError> {
    let field = resolve_field(schema, form, path)?;
    if field.kind == FieldKind::File {
        Ok(())
    } else {
        Err(FormError::KindMismatch {
            field: path.to_string(),
            expected: FieldKind::File,
        })
    }
}

fn resolve_field<'s>(
    schema: &'s PageTypeSchema,
    form: &FormData,
    path: &FieldPath,
) -> Result<&'s FieldDef, FormError> {
    let unknown = || FormError::UnknownField(path.to_string());
    match path {
        FieldPath::Page { field } => schema.field(field).ok_or_else(unknown),
        FieldPath::Section { index, field } => {
            let instance = form.section(*index)?;
            schema
                .section(&instance.section_type)
                .ok_or_else(|| FormError::UnknownSection(instance.section_type.clone()))?
                .field(field)
                .ok_or_else(unknown)
        }
        FieldPath::Item { parent, field, .. } => {
            if parent.is_item() {
                return Err(FormError::InvalidPath(path.to_string()));
            }
            let parent_def = resolve_field(schema, form, parent)?;
            if !parent_def.kind.is_array() {
                return Err(FormError::NotAnArrayField(parent.to_string()));
            }
            parent_def.item_field(field).ok_or_else(unknown)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{MockNotifier, MockUploader, NotificationLevel};
    use examdesk_schema::SectionDef;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::with_schemas(vec![PageTypeSchema::new("event", "Event")
            .with_field(FieldDef::text("title", "Title").required())
            .with_field(FieldDef::file("poster", "Poster"))
            .with_section(SectionDef::new(
                "speakers",
                "Speakers",
                vec![FieldDef::array(
                    "people",
                    "People",
                    vec![FieldDef::text("name", "Name"), FieldDef::file("photo", "Photo")],
                )],
            ))])
        .unwrap()
    }

    fn editor(registry: &SchemaRegistry, notifier: MockNotifier) -> PageEditor<'_> {
        PageEditor::new(registry, Arc::new(MockUploader::new()), Arc::new(notifier))
    }

    fn silent() -> MockNotifier {
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();
        notifier
    }

    #[test]
    fn edits_need_a_schema() {
        let registry = registry();
        let mut editor = editor(&registry, silent());
        assert!(matches!(editor.set_field("title", "x"), Err(FormError::NoPageType)));
        editor.select_page_type("nope");
        assert!(matches!(
            editor.add_section("speakers"),
            Err(FormError::UnknownPageType(_))
        ));
        assert_eq!(editor.render().placeholder().unwrap(), "No schema found for page type `nope`.");
    }

    #[test]
    fn set_field_merges_into_form() {
        let registry = registry();
        let mut editor = editor(&registry, silent());
        editor.select_page_type("event");
        editor.set_field("title", "Open day").unwrap();
        assert_eq!(editor.form().text_at(&FieldPath::page("title")), Some("Open day"));
    }

    #[test]
    fn open_reads_id_and_page_type() {
        let registry = registry();
        let mut editor = editor(&registry, silent());
        editor
            .open(None, &json!({ "id": 42, "page_type": "event", "title": "Fair" }))
            .unwrap();
        assert_eq!(editor.record_id(), Some("42"));
        assert_eq!(editor.page_type(), Some("event"));

        editor.open(Some("other"), &json!({ "id": "abc" })).unwrap();
        assert_eq!(editor.record_id(), Some("abc"));
        assert_eq!(editor.page_type(), Some("other"));
        assert!(editor.form().fields.is_empty());
    }

    #[test]
    fn field_at_resolves_item_paths() {
        let registry = registry();
        let mut editor = editor(&registry, silent());
        editor.select_page_type("event");
        editor.add_section("speakers").unwrap();
        editor
            .edit_section_array(0, "people", ArrayEdit::Add)
            .unwrap();

        let photo = "sections[0].people[0].photo".parse::<FieldPath>().unwrap();
        assert_eq!(editor.field_at(&photo).unwrap().kind, FieldKind::File);
        let bad = "sections[0].people[0].age".parse::<FieldPath>().unwrap();
        assert!(matches!(editor.field_at(&bad), Err(FormError::UnknownField(_))));
        assert!(matches!(
            editor.field_at(&FieldPath::page("title").item(0, "x")),
            Err(FormError::NotAnArrayField(_))
        ));
    }

    #[test]
    fn begin_upload_requires_file_field() {
        let registry = registry();
        let mut editor = editor(&registry, silent());
        editor.select_page_type("event");
        let err = editor
            .begin_upload(FieldPath::page("title"), UploadFile::new("a.png", vec![]))
            .unwrap_err();
        assert!(matches!(err, FormError::KindMismatch { expected: FieldKind::File, .. }));
        assert!(editor
            .begin_upload(FieldPath::page("poster"), UploadFile::new("a.png", vec![]))
            .is_ok());
    }

    #[tokio::test]
    async fn submit_creates_then_updates() {
        let registry = registry();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Info)
            .times(2)
            .return_const(());
        let mut editor = editor(&registry, notifier);
        editor.select_page_type("event");
        editor.set_field("title", "Open day").unwrap();

        let mut store = MockPageStore::new();
        store
            .expect_create()
            .withf(|payload| payload["page_type"] == "event" && payload["title"] == "Open day")
            .times(1)
            .returning(|_| Ok(SavedPage::new("7")));
        store
            .expect_update()
            .withf(|id, _| id == "7")
            .times(1)
            .returning(|id, _| Ok(SavedPage::new(id)));

        assert_eq!(editor.submit(&store).await.unwrap().id, "7");
        assert_eq!(editor.record_id(), Some("7"));
        assert_eq!(editor.submit(&store).await.unwrap().id, "7");
    }

    #[tokio::test]
    async fn submit_rejected_while_invalid_or_uploading() {
        let registry = registry();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.level == NotificationLevel::Error)
            .times(2)
            .return_const(());
        let mut editor = editor(&registry, notifier);
        editor.select_page_type("event");

        let mut store = MockPageStore::new();
        store.expect_create().never();

        assert!(matches!(editor.submit(&store).await, Err(FormError::Invalid(_))));

        editor.set_field("title", "Open day").unwrap();
        let _task = editor
            .begin_upload(FieldPath::page("poster"), UploadFile::new("p.png", vec![1]))
            .unwrap();
        assert!(matches!(
            editor.submit(&store).await,
            Err(FormError::UploadsPending(1))
        ));
    }

    #[tokio::test]
    async fn store_failure_is_notified() {
        let registry = registry();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.message == "Save failed: slug taken")
            .times(1)
            .return_const(());
        let mut editor = editor(&registry, notifier);
        editor.select_page_type("event");
        editor.set_field("title", "Open day").unwrap();

        let mut store = MockPageStore::new();
        store
            .expect_create()
            .returning(|_| Err(StoreError::new("slug taken")));

        let err = editor.submit(&store).await.unwrap_err();
        assert!(!err.is_user_error());
        assert_eq!(editor.record_id(), None);
    }
}
