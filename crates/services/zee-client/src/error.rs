use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when using the Zee client
#[derive(Debug, Error)]
pub enum ZeeError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Non-success response from the backend
    #[error("{message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Human-readable message (the body's `error` field or a fallback)
        message: String,
    },

    /// Configuration error (e.g., malformed base URL)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(String),

    /// Error event reported inside an event stream
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorObject {
    /// Human-readable error message
    #[serde(default)]
    pub error: Option<String>,
}

impl ZeeError {
    /// HTTP status of an API error, if this is one
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 404 responses
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

/// Maps a serde deserialization error to a `ZeeError` with context
#[must_use]
pub fn map_deser(e: &serde_json::Error, body: &[u8]) -> ZeeError {
    let snippet = String::from_utf8_lossy(&body[..body.len().min(400)]).to_string();
    ZeeError::Serde(format!("{e}: {snippet}"))
}

/// Extracts the backend's `error` message from a response body.
///
/// Returns `fallback` when the body is not JSON or carries no message.
#[must_use]
pub fn api_error_message(body: &[u8], fallback: &str) -> String {
    serde_json::from_slice::<ApiErrorObject>(body)
        .ok()
        .and_then(|obj| obj.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Builds an API error from a non-success response
#[must_use]
pub fn deserialize_api_error(status: StatusCode, body: &[u8], fallback: &str) -> ZeeError {
    ZeeError::Api {
        status: status.as_u16(),
        message: api_error_message(body, fallback),
    }
}
