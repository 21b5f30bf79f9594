//! Command line configuration

use clap::{Parser, Subcommand};

use crate::config::{logging::LoggingArgs, server::ServerArgs, widget::WidgetArgs};

pub(crate) mod logging;
pub(crate) mod server;
pub(crate) mod widget;

/// Lattice Cart command line configuration
#[derive(Debug, Parser)]
#[command(name = "lattice-cart", about = "Storefront cart from the terminal", long_about = None)]
pub(crate) struct CliConfig {
    /// Storefront connection settings.
    #[command(flatten)]
    pub(crate) server: ServerArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub(crate) logging: LoggingArgs,

    /// Cart widget behaviour.
    #[command(flatten)]
    pub(crate) widget: WidgetArgs,

    /// Operation to run.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub(crate) enum Command {
    /// Print the cart count badge.
    Count,

    /// Print the cart.
    Show,

    /// Add a product variant to the cart.
    Add {
        /// Variant identifier
        variant: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Change the quantity of a cart line.
    Update {
        /// Line identifier
        item: String,

        /// New quantity, as typed
        quantity: String,
    },

    /// Remove a cart line.
    Remove {
        /// Line identifier
        item: String,
    },

    /// Remove every line from the cart.
    Clear,

    /// Print the mini-cart preview.
    Preview,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
