//! Cart Widget Config

use std::{fs, path::PathBuf};

use clap::{Args, ValueEnum};
use lattice_cart::config::{ControllerConfig, SyncMode};

use crate::errors::ConfigError;

/// View synchronisation, as chosen on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SyncArg {
    /// Patch the view from mutation responses.
    Patch,

    /// Reload the whole cart after every mutation.
    Reload,
}

impl From<SyncArg> for SyncMode {
    fn from(sync: SyncArg) -> Self {
        match sync {
            SyncArg::Patch => Self::Patch,
            SyncArg::Reload => Self::Reload,
        }
    }
}

/// Cart widget settings. Flags override values from the YAML file.
#[derive(Debug, Args)]
pub(crate) struct WidgetArgs {
    /// YAML file with controller settings
    #[arg(short, long, env = "CART_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// How the view follows a mutation (patch, reload)
    #[arg(long, env = "CART_SYNC", value_enum)]
    pub(crate) sync: Option<SyncArg>,

    /// Idle time before a quantity edit is sent, in milliseconds
    #[arg(long, env = "CART_DEBOUNCE_MS")]
    pub(crate) debounce_ms: Option<u64>,

    /// ISO 4217 currency used to display amounts
    #[arg(long, env = "CART_CURRENCY")]
    pub(crate) currency: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long)]
    pub(crate) yes: bool,
}

impl WidgetArgs {
    /// Build the controller configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be read or parsed.
    pub(crate) fn controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => {
                let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;

                parse_controller_config(&yaml).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
            None => ControllerConfig::default(),
        };

        if let Some(sync) = self.sync {
            config.sync = sync.into();
        }

        if let Some(debounce_ms) = self.debounce_ms {
            config.debounce_ms = debounce_ms;
        }

        if let Some(currency) = &self.currency {
            config.currency.clone_from(currency);
        }

        Ok(config)
    }
}

fn parse_controller_config(yaml: &str) -> Result<ControllerConfig, serde_norway::Error> {
    serde_norway::from_str(yaml)
}
