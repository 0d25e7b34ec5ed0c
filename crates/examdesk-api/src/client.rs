//! Shared HTTP client

use std::sync::Arc;

use reqwest::{header, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// User agent sent with every request
const USER_AGENT: &str = concat!("examdesk/", env!("CARGO_PKG_VERSION"));

/// HTTP client bound to one backend
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    config: ApiConfig,
    http: reqwest::Client,
}

/// Error body the backend sends with non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    /// Build a client from settings
    ///
    /// # Errors
    /// Returns error if the token is not a valid header value or the client cannot be built
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        if let Some(token) = config.token.as_deref() {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Config("token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner { config, http }),
        })
    }

    /// Settings this client was built with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner.config.endpoint(path)
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.inner.http.post(url)
    }

    pub(crate) fn put(&self, url: Url) -> RequestBuilder {
        self.inner.http.put(url)
    }

    /// Send and decode a JSON success body
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let bytes = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    tracing::warn!(%url, status = status.as_u16(), %message, "backend rejected request");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
