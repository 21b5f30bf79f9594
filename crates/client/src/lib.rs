//! Lattice Cart Client
//!
//! `reqwest` implementation of [`lattice_cart::api::CartApi`] for storefronts serving the form
//! endpoints under `/cart/` or the JSON API under `/cart/api/`.

pub mod config;
pub mod csrf;
pub mod errors;
pub mod fragment;
mod http;
mod payload;

pub use config::{ClientConfig, Flavor};
pub use csrf::CsrfToken;
pub use errors::ClientError;
pub use http::HttpCartApi;

pub use reqwest::Url;
