//! Lattice Cart command line front end

use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use lattice_cart::{
    confirm::{AutoConfirm, Confirmer},
    controller::CartController,
    notify::ChannelNotifier,
};
use lattice_cart_client::HttpCartApi;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::{config::CliConfig, confirm::TerminalConfirmer, errors::CliError};

mod commands;
mod config;
mod confirm;
mod errors;
mod logging;
mod render;

/// Lattice Cart entry point
#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(clap_error) => {
            _ = clap_error.print();

            return ExitCode::from(u8::try_from(clap_error.exit_code()).unwrap_or(2));
        }
    };

    if let Err(init_error) = logging::init_subscriber(&config.logging) {
        _ = writeln!(io::stderr(), "{}", CliError::from(init_error));

        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Cart(cart_error)) => {
            debug!(%cart_error, "cart command failed");

            ExitCode::FAILURE
        }
        Err(cli_error) => {
            error!(%cli_error, "cart command could not run");

            _ = writeln!(io::stderr(), "{cli_error}");

            ExitCode::FAILURE
        }
    }
}

async fn run(config: CliConfig) -> Result<(), CliError> {
    let api = HttpCartApi::new(config.server.client_config()?)?;

    if let Some(cookie) = &config.server.session {
        api.add_cookie(cookie);
    }

    let confirmer: Arc<dyn Confirmer> = if config.widget.yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(TerminalConfirmer)
    };

    let (sender, mut notifications) = mpsc::unbounded_channel();

    let controller = CartController::new(
        Arc::new(api),
        Arc::new(ChannelNotifier::new(sender)),
        confirmer,
        config.widget.controller_config()?,
    )?;

    commands::run(
        &config.command,
        &controller,
        &mut notifications,
        &mut io::stdout(),
    )
    .await
}
