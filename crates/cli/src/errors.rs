//! Errors

use std::{io, path::PathBuf};

use lattice_cart::{errors::CartError, money::CurrencyError};
use lattice_cart_client::ClientError;
use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Configuration errors.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The storefront URL does not parse.
    #[error("invalid storefront URL {url}: {reason}")]
    BaseUrl {
        /// URL as given
        url: String,

        /// Parser message
        reason: String,
    },

    /// The controller settings file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File path
        path: PathBuf,

        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The controller settings file is not valid YAML for the settings.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File path
        path: PathBuf,

        /// Underlying error
        #[source]
        source: serde_norway::Error,
    },
}

/// Errors ending a command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialised.
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] TryInitError),

    /// The storefront client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The configured currency is unknown.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// The cart operation failed; the user has already been told why.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}
