//! Testing utilities for the examdesk workspace
//!
//! Shared schema fixtures and in-memory stand-ins for the form engine's
//! collaborators.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use examdesk_forms::{
    Notification, NotificationLevel, Notifier, PageStore, SavedPage, StoreError, UploadError,
    UploadFile, UploadedFile, Uploader,
};
use examdesk_schema::{FieldDef, PageTypeSchema, SchemaRegistry, SectionDef};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;

/// `intro_page`: required `title`, a `logo` file, a `faqs` array and one
/// `intro` section with a heading, a background file and `bullets<{text}>`.
pub fn intro_schema() -> PageTypeSchema {
    PageTypeSchema::new("intro_page", "Intro Page")
        .with_field(FieldDef::text("title", "Title").required())
        .with_field(FieldDef::file("logo", "Logo"))
        .with_field(FieldDef::array(
            "faqs",
            "FAQ",
            vec![
                FieldDef::text("question", "Question").required(),
                FieldDef::editor("answer", "Answer"),
            ],
        ))
        .with_section(SectionDef::new(
            "intro",
            "Intro",
            vec![
                FieldDef::text("heading", "Heading"),
                FieldDef::file("background_image", "Background Image"),
                FieldDef::array("bullets", "Bullets", vec![FieldDef::text("text", "Text")]),
            ],
        ))
        .with_section(SectionDef::new(
            "cta",
            "Call to Action",
            vec![FieldDef::text("label", "Label"), FieldDef::number("discount", "Discount")],
        ))
}

pub fn intro_registry() -> SchemaRegistry {
    SchemaRegistry::with_schemas(vec![intro_schema()]).unwrap()
}

/// Uploader that replays queued results, then echoes `uploads/{file_name}`
#[derive(Debug, Default)]
pub struct ScriptedUploader {
    script: Mutex<VecDeque<Result<UploadedFile, UploadError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedUploader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn succeeding(filename: &str) -> Arc<Self> {
        let uploader = Self::new();
        uploader.push(Ok(UploadedFile::new(filename)));
        uploader
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let uploader = Self::new();
        uploader.push(Err(UploadError::new(message)));
        uploader
    }

    pub fn push(&self, result: Result<UploadedFile, UploadError>) {
        self.script.lock().push_back(result);
    }

    /// `(file_name, field)` of every call so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Uploader for ScriptedUploader {
    async fn upload(&self, file: UploadFile, field: &str) -> Result<UploadedFile, UploadError> {
        self.calls
            .lock()
            .push((file.file_name.clone(), field.to_string()));
        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| Ok(UploadedFile::new(format!("uploads/{}", file.file_name))))
    }
}

/// Notifier that keeps everything it was sent
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter(|n| n.level == NotificationLevel::Info)
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

/// Page store over a vector; ids are `page-{n}` starting at 1
#[derive(Debug, Default)]
pub struct InMemoryPageStore {
    pages: Mutex<Vec<(String, JsonValue)>>,
    reject_with: Mutex<Option<String>>,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every following call with `message`
    pub fn reject_with(&self, message: &str) {
        *self.reject_with.lock() = Some(message.to_string());
    }

    pub fn get(&self, id: &str) -> Option<JsonValue> {
        self.pages
            .lock()
            .iter()
            .find(|(page_id, _)| page_id == id)
            .map(|(_, payload)| payload.clone())
    }

    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.reject_with.lock().as_deref() {
            Some(message) => Err(StoreError::new(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PageStore for InMemoryPageStore {
    async fn create(&self, payload: JsonValue) -> Result<SavedPage, StoreError> {
        self.check()?;
        let mut pages = self.pages.lock();
        let id = format!("page-{}", pages.len() + 1);
        pages.push((id.clone(), payload));
        Ok(SavedPage::new(id))
    }

    async fn update(&self, id: &str, payload: JsonValue) -> Result<SavedPage, StoreError> {
        self.check()?;
        let mut pages = self.pages.lock();
        let slot = pages
            .iter_mut()
            .find(|(page_id, _)| page_id == id)
            .ok_or_else(|| StoreError::new(format!("page {id} not found")))?;
        slot.1 = payload;
        Ok(SavedPage::new(id))
    }
}
