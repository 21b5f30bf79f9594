//! Errors

use thiserror::Error;

use crate::api::ApiError;

/// Why a cart operation did not complete.
///
/// By the time an operation returns one of these the user has already been
/// notified and the affected element has been reverted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// The server could not be reached or its response could not be read.
    #[error("network failure: {0}")]
    Network(String),

    /// The server declined the request.
    #[error("server declined the request: {}", .message.as_deref().unwrap_or("no message"))]
    Server {
        /// Server-supplied message.
        message: Option<String>,
    },

    /// The request was invalid before anything was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The background task running the operation stopped unexpectedly.
    #[error("cart operation was interrupted")]
    Interrupted,
}

impl From<ApiError> for CartError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Transport(reason) => Self::Network(reason),
            ApiError::Rejected(rejection) => Self::Server {
                message: rejection.message,
            },
        }
    }
}
