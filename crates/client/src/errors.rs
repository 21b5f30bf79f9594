//! Errors

use thiserror::Error;

/// Errors building a [`crate::HttpCartApi`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL cannot have endpoint paths appended to it.
    #[error("{0} cannot be used as a storefront base URL")]
    InvalidBaseUrl(String),

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}
