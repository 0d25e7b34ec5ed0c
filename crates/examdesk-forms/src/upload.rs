//! File uploads
//!
//! Each file field runs its own explicit state machine:
//!
//! ```text
//! Idle ──begin──▶ Uploading{preview} ──finish──▶ Succeeded{stored}
//!   ▲                                      └───▶ Failed{message}
//!   └──────── begin again from Succeeded / Failed ────────┘
//! ```
//!
//! [`UploadCoordinator::begin`] flips the field to `Uploading` and hands back
//! an [`UploadTask`]; the caller drives the task to completion while the form
//! stays editable, then feeds the [`UploadCompletion`] to
//! [`UploadCoordinator::finish`]. There is no retry and no cancellation.
//!
//! In-flight uploads are tracked by ticket, not by path: when a section or an
//! array item is removed the coordinator moves every later state and pending
//! upload down with it, and a completion whose field was removed is reported
//! as a failure instead of landing on whatever shifted into its place.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::FormError;
use crate::form_data::FormData;
use crate::path::FieldPath;

/// Binary file chosen by the user
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name
    pub file_name: String,
    /// MIME type, if known
    pub content_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Create from name and contents
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Set MIME type
    #[inline]
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Successful upload result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Server-assigned filename or path; becomes the field's stored value
    pub filename: String,
}

impl UploadedFile {
    /// Create from the server-assigned name
    #[inline]
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }
}

/// Upload failure with a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UploadError {
    /// Message shown to the user
    pub message: String,
}

impl UploadError {
    /// Create from a message
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// File upload collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload `file` for the field named `field`
    async fn upload(&self, file: UploadFile, field: &str) -> Result<UploadedFile, UploadError>;
}

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Confirmation
    Info,
    /// Failure the user should see
    Error,
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
}

impl Notification {
    /// Info notification
    #[inline]
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Error notification
    #[inline]
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for transient user notifications
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show a notification
    fn notify(&self, notification: Notification);
}

/// Notifier that writes to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => tracing::info!("{}", notification.message),
            NotificationLevel::Error => tracing::error!("{}", notification.message),
        }
    }
}

/// Upload state of one file field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    /// Nothing in flight
    #[default]
    Idle,
    /// Upload running; the local preview is shown meanwhile
    Uploading {
        /// Opaque local handle for the chosen file, unique per upload.
        /// It is not derived from the file contents and means nothing to the backend.
        preview_url: String,
    },
    /// Upload stored a server filename
    Succeeded {
        /// Server-assigned filename
        stored: String,
    },
    /// Upload failed; the field kept its prior value
    Failed {
        /// Message shown to the user
        message: String,
    },
}

impl UploadState {
    /// Busy indicator; the field's upload control is disabled while set
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Uploading { .. })
    }

    /// Local preview URL while uploading
    #[inline]
    #[must_use]
    pub fn preview_url(&self) -> Option<&str> {
        match self {
            Self::Uploading { preview_url } => Some(preview_url),
            _ => None,
        }
    }
}

static IDLE: UploadState = UploadState::Idle;

/// Upload states of every file field of one form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStates {
    states: HashMap<FieldPath, UploadState>,
}

impl UploadStates {
    /// Create with every field idle
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one field
    #[must_use]
    pub fn state(&self, path: &FieldPath) -> &UploadState {
        self.states.get(path).unwrap_or(&IDLE)
    }

    /// Number of uploads in flight
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.states.values().filter(|s| s.is_busy()).count()
    }

    fn set(&mut self, path: FieldPath, state: UploadState) {
        tracing::debug!(field = %path, ?state, "upload state changed");
        self.states.insert(path, state);
    }

    fn rekey(&mut self, moved: impl Fn(&FieldPath) -> Option<FieldPath>) {
        self.states = self
            .states
            .drain()
            .filter_map(|(path, state)| Some((moved(&path)?, state)))
            .collect();
    }

    /// Forget all states
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

/// Upload handed out by [`UploadCoordinator::begin`]
pub struct UploadTask {
    ticket: Uuid,
    path: FieldPath,
    file: UploadFile,
    uploader: Arc<dyn Uploader>,
}

impl fmt::Debug for UploadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadTask")
            .field("ticket", &self.ticket)
            .field("path", &self.path)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl UploadTask {
    /// Field this upload targets
    #[inline]
    #[must_use]
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Run the collaborator to completion
    pub async fn run(self) -> UploadCompletion {
        let result = self
            .uploader
            .upload(self.file, self.path.field_name())
            .await;
        UploadCompletion {
            ticket: self.ticket,
            path: self.path,
            result,
        }
    }
}

/// Outcome of an [`UploadTask`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCompletion {
    ticket: Uuid,
    /// Field the upload targeted when it began; edits since may have moved it
    pub path: FieldPath,
    /// Collaborator result
    pub result: Result<UploadedFile, UploadError>,
}

/// Per-form upload driver
///
/// Owns the upload states, the upload collaborator and the user notifier.
pub struct UploadCoordinator {
    uploader: Arc<dyn Uploader>,
    notifier: Arc<dyn Notifier>,
    states: UploadStates,
    pending: HashMap<Uuid, FieldPath>,
}

impl fmt::Debug for UploadCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCoordinator")
            .field("states", &self.states)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl UploadCoordinator {
    /// Create coordinator
    #[must_use]
    pub fn new(uploader: Arc<dyn Uploader>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            uploader,
            notifier,
            states: UploadStates::new(),
            pending: HashMap::new(),
        }
    }

    /// All field states
    #[inline]
    #[must_use]
    pub fn states(&self) -> &UploadStates {
        &self.states
    }

    /// State of one field
    #[inline]
    #[must_use]
    pub fn state(&self, path: &FieldPath) -> &UploadState {
        self.states.state(path)
    }

    /// Notifier shared with the owning editor
    #[inline]
    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Start an upload for one field
    ///
    /// # Errors
    /// Returns [`FormError::UploadInProgress`] if that field is already uploading
    pub fn begin(&mut self, path: FieldPath, file: UploadFile) -> Result<UploadTask, FormError> {
        if self.states.state(&path).is_busy() {
            tracing::warn!(field = %path, "rejected duplicate upload");
            return Err(FormError::UploadInProgress(path));
        }

        let ticket = Uuid::new_v4();
        let preview_url = format!("blob:local/{ticket}/{}", file.file_name);
        self.states
            .set(path.clone(), UploadState::Uploading { preview_url });
        self.pending.insert(ticket, path.clone());

        Ok(UploadTask {
            ticket,
            path,
            file,
            uploader: Arc::clone(&self.uploader),
        })
    }

    /// Apply a finished upload to the latest form state
    ///
    /// Success stores the returned filename at the field's current path.
    /// Failure, or a path that no longer resolves, leaves the form as it was,
    /// marks the field failed and sends exactly one error notification.
    #[must_use]
    pub fn finish(&mut self, form: &FormData, completion: UploadCompletion) -> FormData {
        self.finish_checked(form, completion, |_| Ok(()))
    }

    /// [`UploadCoordinator::finish`], with `accepts` deciding whether the
    /// field at the current path may still take the stored filename
    ///
    /// A rejection is handled like an upload failure.
    #[must_use]
    pub fn finish_checked(
        &mut self,
        form: &FormData,
        completion: UploadCompletion,
        accepts: impl FnOnce(&FieldPath) -> Result<(), FormError>,
    ) -> FormData {
        let UploadCompletion {
            ticket,
            path: started_at,
            result,
        } = completion;

        let Some(path) = self.pending.remove(&ticket) else {
            tracing::warn!(field = %started_at, "upload finished after its field was removed");
            self.notifier.notify(Notification::error(format!(
                "Upload failed: {started_at} was removed before the upload finished"
            )));
            return form.clone();
        };

        let failure = match result {
            Ok(uploaded) => {
                let mut next = form.clone();
                match accepts(&path).and_then(|()| next.set_text(&path, uploaded.filename.clone())) {
                    Ok(()) => {
                        self.states.set(
                            path,
                            UploadState::Succeeded {
                                stored: uploaded.filename,
                            },
                        );
                        return next;
                    }
                    Err(e) => e.to_string(),
                }
            }
            Err(e) => e.message,
        };

        tracing::warn!(field = %path, error = %failure, "upload failed");
        self.notifier
            .notify(Notification::error(format!("Upload failed: {failure}")));
        self.states
            .set(path, UploadState::Failed { message: failure });
        form.clone()
    }

    /// Follow the removal of section `index`
    ///
    /// States and pending uploads of that section are dropped; later
    /// sections move down by one.
    pub fn section_removed(&mut self, index: usize) {
        self.rekey(|path| path.after_section_removed(index));
    }

    /// Follow the removal of item `index` of the array field at `array`
    pub fn item_removed(&mut self, array: &FieldPath, index: usize) {
        self.rekey(|path| path.after_item_removed(array, index));
    }

    fn rekey(&mut self, moved: impl Fn(&FieldPath) -> Option<FieldPath>) {
        self.states.rekey(&moved);
        self.pending = self
            .pending
            .drain()
            .filter_map(|(ticket, path)| Some((ticket, moved(&path)?)))
            .collect();
    }

    /// Begin, run and finish one upload
    ///
    /// # Errors
    /// Returns [`FormError::UploadInProgress`] if that field is already uploading
    pub async fn upload(
        &mut self,
        form: &FormData,
        path: FieldPath,
        file: UploadFile,
    ) -> Result<FormData, FormError> {
        let task = self.begin(path, file)?;
        let completion = task.run().await;
        Ok(self.finish(form, completion))
    }

    /// Forget all states; uploads still running will finish as removed
    pub fn reset(&mut self) {
        self.states.clear();
        self.pending.clear();
    }
}
