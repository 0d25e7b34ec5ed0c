//! Page persistence collaborator

use async_trait::async_trait;
use examdesk_forms::{PageStore, SavedPage, StoreError};
use serde_json::Value as JsonValue;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Pages collection, relative to the base URL
pub const PAGES_PATH: &str = "pages";

/// Saves pages with `POST {base}/pages` and `PUT {base}/pages/{id}`
#[derive(Debug, Clone)]
pub struct HttpPageStore {
    client: ApiClient,
}

impl HttpPageStore {
    /// Create store over a client
    #[inline]
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a page
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status, or a body without an id
    pub async fn create_page(&self, payload: &JsonValue) -> Result<SavedPage, ApiError> {
        let url = self.client.endpoint(PAGES_PATH)?;
        let body: JsonValue = self.client.send(self.client.post(url).json(payload)).await?;
        let saved = saved_page(&body)?;
        tracing::info!(id = %saved.id, "page created");
        Ok(saved)
    }

    /// Replace a page
    ///
    /// A response without an id keeps the requested one.
    ///
    /// # Errors
    /// Returns error on transport failure or non-success status
    pub async fn update_page(&self, id: &str, payload: &JsonValue) -> Result<SavedPage, ApiError> {
        let url = self.client.endpoint(&format!("{PAGES_PATH}/{id}"))?;
        let body: JsonValue = self.client.send(self.client.put(url).json(payload)).await?;
        let saved = saved_page(&body).unwrap_or_else(|_| SavedPage::new(id));
        tracing::info!(id = %saved.id, "page updated");
        Ok(saved)
    }
}

fn saved_page(body: &JsonValue) -> Result<SavedPage, ApiError> {
    match body.get("id") {
        Some(JsonValue::String(id)) if !id.is_empty() => Ok(SavedPage::new(id.clone())),
        Some(JsonValue::Number(id)) => Ok(SavedPage::new(id.to_string())),
        _ => Err(ApiError::Decode("page response has no `id`".to_string())),
    }
}

#[async_trait]
impl PageStore for HttpPageStore {
    async fn create(&self, payload: JsonValue) -> Result<SavedPage, StoreError> {
        Ok(self.create_page(&payload).await?)
    }

    async fn update(&self, id: &str, payload: JsonValue) -> Result<SavedPage, StoreError> {
        Ok(self.update_page(id, &payload).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_string_or_number() {
        assert_eq!(saved_page(&json!({ "id": "p-9" })).unwrap().id, "p-9");
        assert_eq!(saved_page(&json!({ "id": 12 })).unwrap().id, "12");
        assert!(matches!(saved_page(&json!({ "id": "" })), Err(ApiError::Decode(_))));
        assert!(matches!(saved_page(&json!({ "ok": true })), Err(ApiError::Decode(_))));
    }
}
