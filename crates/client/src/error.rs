//! Error types for the API client.

use thiserror::Error;

use crate::credentials::CredentialError;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status.
    ///
    /// The message is the backend's structured `detail`/`error` string when
    /// one was present, else a generic message carrying the status code.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Human-readable message extracted from the response body.
        message: String,
    },

    /// The response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The credential store failed.
    #[error("Credential store error: {0}")]
    Credentials(#[from] CredentialError),

    /// An endpoint URL could not be constructed from the base URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status code of the failure, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
