//! Error types for the TaskFlow client

use thiserror::Error;

use crate::types::ErrorDetail;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Refresh token absent, or the refresh call itself failed.
    /// Stored credentials have already been cleared when this is returned.
    #[error("session expired")]
    SessionExpired,

    /// The server returned a structured error body
    /// (`{"error":{"code":...,"message":...}}`). The message is surfaced
    /// verbatim via `Display`.
    #[error("{message}")]
    Api {
        code: String,
        message: String,
        details: Vec<ErrorDetail>,
    },

    /// Network-level failure, timeout, or a non-2xx response without a
    /// structured error body.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client-side pre-flight rejection of an attachment (size or MIME
    /// type outside the backend's accepted limits).
    #[error("Upload rejected: {0}")]
    UploadRejected(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Error code from a structured server error, if any.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
