//! Storefront Config

use clap::{Args, ValueEnum};
use lattice_cart_client::{ClientConfig, CsrfToken, Flavor, Url};

use crate::errors::ConfigError;

/// Endpoint family, as chosen on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum FlavorArg {
    /// Form-encoded endpoints under `/cart/`.
    Form,

    /// JSON API under `/cart/api/`.
    Json,
}

impl From<FlavorArg> for Flavor {
    fn from(flavor: FlavorArg) -> Self {
        match flavor {
            FlavorArg::Form => Self::Form,
            FlavorArg::Json => Self::Json,
        }
    }
}

/// Storefront connection settings.
#[derive(Debug, Args)]
pub(crate) struct ServerArgs {
    /// Storefront root URL
    #[arg(
        short,
        long,
        env = "STOREFRONT_URL",
        default_value = "http://localhost:8000/"
    )]
    pub(crate) base_url: String,

    /// Endpoint family used for mutations (form, json)
    #[arg(long, env = "CART_API_FLAVOR", value_enum, default_value_t = FlavorArg::Form)]
    pub(crate) flavor: FlavorArg,

    /// CSRF token used when the storefront has not set a `csrftoken` cookie
    #[arg(long, env = "CSRF_TOKEN", hide_env_values = true)]
    pub(crate) csrf_token: Option<String>,

    /// Cookie to send with every request, e.g. `sessionid=...`
    #[arg(long, env = "SESSION_COOKIE", hide_env_values = true)]
    pub(crate) session: Option<String>,
}

impl ServerArgs {
    /// Build the client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL does not parse.
    pub(crate) fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url = Url::parse(&self.base_url).map_err(|error| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            reason: error.to_string(),
        })?;

        Ok(ClientConfig {
            base_url,
            flavor: self.flavor.into(),
            csrf_token: self.csrf_token.clone().map(CsrfToken::new),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn args(base_url: &str) -> ServerArgs {
        ServerArgs {
            base_url: base_url.to_string(),
            flavor: FlavorArg::Json,
            csrf_token: Some("tok".to_string()),
            session: None,
        }
    }

    #[test]
    fn client_config_carries_every_setting() -> TestResult {
        let config = args("https://shop.test/").client_config()?;

        assert_eq!(config.base_url.as_str(), "https://shop.test/");
        assert_eq!(config.flavor, Flavor::Json);
        assert_eq!(
            config.csrf_token.as_ref().map(CsrfToken::expose),
            Some("tok")
        );

        Ok(())
    }

    #[test]
    fn unparseable_urls_are_reported() {
        assert!(matches!(
            args("not a url").client_config(),
            Err(ConfigError::BaseUrl { .. })
        ));
    }
}
