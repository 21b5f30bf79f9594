//! Client configuration

use reqwest::Url;
use serde::Deserialize;

use crate::csrf::CsrfToken;

/// Which family of storefront endpoints mutations are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// Form-encoded endpoints under `/cart/`.
    #[default]
    Form,

    /// JSON API under `/cart/api/`.
    Json,
}

/// Configuration for connecting to a storefront.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Storefront root, e.g. `"https://shop.example.com/"`.
    pub base_url: Url,

    /// Endpoint family used for mutations.
    pub flavor: Flavor,

    /// Token used when the cookie jar holds no `csrftoken` cookie.
    pub csrf_token: Option<CsrfToken>,
}

impl ClientConfig {
    /// Form-endpoint configuration for `base_url` with no fallback token.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            flavor: Flavor::Form,
            csrf_token: None,
        }
    }
}
