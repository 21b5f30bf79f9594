//! HTTP implementation of the cart API.

use std::sync::Arc;

use async_trait::async_trait;
use lattice_cart::{
    api::{
        AddResponse, ApiError, CartApi, CartSnapshot, ClearResponse, Rejection, RemoveResponse,
        UpdateResponse,
    },
    ids::{ItemId, VariantId},
};
use reqwest::{
    Client, Method, RequestBuilder, Url,
    cookie::Jar,
    header::{ACCEPT, HeaderName},
};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    config::{ClientConfig, Flavor},
    csrf::{self, CsrfToken},
    errors::ClientError,
    fragment,
    payload::{self, CountPayload},
};

const REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrftoken");

fn transport(error: reqwest::Error) -> ApiError {
    ApiError::Transport(error.to_string())
}

/// Storefront cart client.
///
/// Keeps its own cookie jar, so session and CSRF cookies set by the
/// storefront are sent back on later requests.
#[derive(Debug, Clone)]
pub struct HttpCartApi {
    config: ClientConfig,
    http: Client,
    jar: Arc<Jar>,
}

impl HttpCartApi {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot take endpoint paths or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(Self { config, http, jar })
    }

    /// Seed the cookie jar, e.g. with a session cookie from a browser.
    pub fn add_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.config.base_url);
    }

    /// Endpoint family used for mutations.
    #[must_use]
    pub fn flavor(&self) -> Flavor {
        self.config.flavor
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.config.base_url.clone();

        let Ok(mut path) = url.path_segments_mut() else {
            return Err(ApiError::Transport(format!(
                "{} cannot be used as a base URL",
                self.config.base_url
            )));
        };

        path.pop_if_empty().extend(segments).push("");
        drop(path);

        Ok(url)
    }

    /// The CSRF token to send: the cookie when the storefront has set one,
    /// else the configured fallback.
    fn csrf_token(&self) -> Option<CsrfToken> {
        csrf::from_cookies(self.jar.as_ref(), &self.config.base_url)
            .or_else(|| self.config.csrf_token.clone())
    }

    fn read(&self, url: Url) -> RequestBuilder {
        self.http
            .get(url)
            .header(REQUESTED_WITH, "XMLHttpRequest")
            .header(ACCEPT, "application/json")
    }

    fn mutate(&self, method: Method, url: Url, token: Option<&CsrfToken>) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header(REQUESTED_WITH, "XMLHttpRequest")
            .header(ACCEPT, "application/json");

        match token.and_then(CsrfToken::header_value) {
            Some(value) => request.header(CSRF_HEADER, value),
            None => {
                warn!("sending cart mutation without a CSRF token");

                request
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();

        debug!(url = %response.url(), %status, "cart response");

        let body = response.text().await.map_err(transport)?;

        payload::classify(status.as_u16(), &body)
    }
}

#[async_trait]
impl CartApi for HttpCartApi {
    async fn count(&self) -> Result<u32, ApiError> {
        let url = self.endpoint(&["cart", "count"])?;
        let count: CountPayload = payload::decode(self.send(self.read(url)).await?)?;

        Ok(count.count)
    }

    async fn add_item(
        &self,
        variant: &VariantId,
        quantity: u32,
    ) -> Result<AddResponse, ApiError> {
        let token = self.csrf_token();

        let request = match self.config.flavor {
            Flavor::Form => {
                let url = self.endpoint(&["cart", "add", variant.as_str()])?;
                let mut form = vec![("quantity", quantity.to_string())];

                if let Some(token) = &token {
                    form.push(("csrfmiddlewaretoken", token.expose().to_string()));
                }

                self.mutate(Method::POST, url, token.as_ref()).form(&form)
            }
            Flavor::Json => {
                let url = self.endpoint(&["cart", "api", "cart"])?;

                self.mutate(Method::POST, url, token.as_ref())
                    .json(&json!({ "variant_id": variant.as_str(), "quantity": quantity }))
            }
        };

        payload::decode(self.send(request).await?)
    }

    async fn update_quantity(
        &self,
        item: &ItemId,
        quantity: u32,
    ) -> Result<UpdateResponse, ApiError> {
        let token = self.csrf_token();

        match self.config.flavor {
            Flavor::Form => {
                let url = self.endpoint(&["cart", "update", item.as_str()])?;
                let form = [("quantity", quantity.to_string()), ("action", "update".to_string())];

                let request = self.mutate(Method::POST, url, token.as_ref()).form(&form);

                payload::decode(self.send(request).await?)
            }
            Flavor::Json => {
                let url = self.endpoint(&["cart", "api", "cart", "items", item.as_str()])?;

                let request = self
                    .mutate(Method::PATCH, url, token.as_ref())
                    .json(&json!({ "quantity": quantity }));

                payload::update_from_snapshot(item, self.send(request).await?)
            }
        }
    }

    async fn remove_item(&self, item: &ItemId) -> Result<RemoveResponse, ApiError> {
        let token = self.csrf_token();

        let request = match self.config.flavor {
            Flavor::Form => {
                let url = self.endpoint(&["cart", "update", item.as_str()])?;

                self.mutate(Method::POST, url, token.as_ref())
                    .form(&[("action", "remove")])
            }
            Flavor::Json => {
                let url = self.endpoint(&["cart", "api", "cart", "items", item.as_str()])?;

                self.mutate(Method::DELETE, url, token.as_ref())
            }
        };

        payload::decode(self.send(request).await?)
    }

    async fn clear(&self) -> Result<ClearResponse, ApiError> {
        let token = self.csrf_token();

        let url = match self.config.flavor {
            Flavor::Form => self.endpoint(&["cart", "clear"])?,
            Flavor::Json => self.endpoint(&["cart", "api", "cart", "clear"])?,
        };

        let request = self.mutate(Method::POST, url, token.as_ref());

        payload::decode_or_default(self.send(request).await?)
    }

    async fn cart(&self) -> Result<CartSnapshot, ApiError> {
        let url = self.endpoint(&["cart", "api", "cart"])?;

        payload::decode(self.send(self.read(url)).await?)
    }

    async fn mini_cart_fragment(&self) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(&["cart", "view"])?;

        let response = self
            .http
            .get(url)
            .header(REQUESTED_WITH, "XMLHttpRequest")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();

        if !status.is_success() {
            return Err(ApiError::Rejected(Rejection {
                status: Some(status.as_u16()),
                ..Rejection::default()
            }));
        }

        let html = response.text().await.map_err(transport)?;

        Ok(fragment::mini_cart_content(&html))
    }
}
