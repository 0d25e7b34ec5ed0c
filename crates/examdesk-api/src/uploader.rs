//! Multipart file upload collaborator

use async_trait::async_trait;
use examdesk_forms::{UploadError, UploadFile, UploadedFile, Uploader};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Upload endpoint, relative to the base URL
pub const UPLOAD_PATH: &str = "upload";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    filename: Option<String>,
    path: Option<String>,
}

/// Uploads files with `POST {base}/upload`
///
/// The body is multipart with a `file` part and a `field` text part naming
/// the form field; the backend answers `{ "filename": ... }` or
/// `{ "path": ... }`.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: ApiClient,
}

impl HttpUploader {
    /// Create uploader over a client
    #[inline]
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Upload and return the stored filename
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status, or a body without a filename
    pub async fn send(&self, file: UploadFile, field: &str) -> Result<UploadedFile, ApiError> {
        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().part("file", part).text("field", field.to_string());

        tracing::debug!(file = %file.file_name, size, field, "uploading file");
        let url = self.client.endpoint(UPLOAD_PATH)?;
        let response: UploadResponse = self.client.send(self.client.post(url).multipart(form)).await?;

        let stored = response
            .filename
            .or(response.path)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::Decode("upload response has no `filename`".to_string()))?;
        tracing::info!(file = %file.file_name, stored = %stored, "file uploaded");
        Ok(UploadedFile::new(stored))
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, file: UploadFile, field: &str) -> Result<UploadedFile, UploadError> {
        Ok(self.send(file, field).await?)
    }
}
