//! Error types for backend calls

use examdesk_forms::{StoreError, UploadError};

/// Main API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport failure, timeout or unreadable body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// Success body did not have the expected shape
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Endpoint URL could not be built
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Settings cannot be used to build a client
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status, if the backend answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message to show the user
    ///
    /// Backend messages are passed through untouched.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ApiError> for UploadError {
    fn from(e: ApiError) -> Self {
        UploadError::new(e.user_message())
    }
}

impl From<ApiError> for StoreError {
    fn from(e: ApiError) -> Self {
        StoreError::new(e.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_passes_through() {
        let e = ApiError::Status {
            status: 413,
            message: "File too large".into(),
        };
        assert_eq!(e.status(), Some(413));
        assert_eq!(UploadError::from(e).message, "File too large");
    }

    #[test]
    fn decode_is_prefixed() {
        let e = StoreError::from(ApiError::Decode("missing `id`".into()));
        assert_eq!(e.message, "unexpected response: missing `id`");
    }
}
