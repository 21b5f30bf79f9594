//! CSRF tokens.

use std::fmt;

use reqwest::{Url, cookie::CookieStore, header::HeaderValue};
use zeroize::Zeroize;

/// Name of the cookie the storefront keeps its CSRF token in.
pub const CSRF_COOKIE: &str = "csrftoken";

/// A CSRF token. Redacted in debug output and wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken {
    value: String,
}

impl CsrfToken {
    /// Wrap a token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The raw token, for request headers and form bodies.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// The token as a sensitive header value, if it is a valid one.
    pub(crate) fn header_value(&self) -> Option<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.value).ok()?;

        value.set_sensitive(true);

        Some(value)
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(**redacted**)")?;
        Ok(())
    }
}

impl Drop for CsrfToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Read the CSRF cookie the store holds for `url`.
pub(crate) fn from_cookies(store: &impl CookieStore, url: &Url) -> Option<CsrfToken> {
    let header = store.cookies(url)?;
    let cookies = header.to_str().ok()?;

    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
        .map(CsrfToken::new)
}
