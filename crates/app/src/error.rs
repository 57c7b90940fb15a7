//! App-level error type shared by the controllers.

use thiserror::Error;

use tiffin_client::{ApiError, SessionError};

/// Errors surfaced by controller operations.
///
/// Validation failures are raised before any request is built, so they
/// never reach the network layer.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client-side validation failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
