//! segcut command-line entry point

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use segcut_cli::adapters::{init_logging, LogSettings};
use segcut_cli::app::container::{AppContainer, DefaultAppContainer};
use segcut_cli::cli::{commands, Cli};
use segcut_cli::config_initialization::initialize_configuration_hierarchy;
use segcut_cli::domain::errors::DomainError;

/// Main entry point for the segcut CLI application
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns the exit code for completed runs; setup failures are errors
async fn run(cli: Cli) -> Result<ExitCode> {
    let loaded =
        initialize_configuration_hierarchy(&cli).context("Failed to load configuration")?;
    let config = loaded.config;

    let settings = LogSettings::new(&config.logging.level, config.logging.json)?;
    init_logging(&settings);

    match &loaded.source {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("Using default configuration"),
    }
    for key in &loaded.env_overrides {
        info!("Environment override: {}", key);
    }

    let prepared = commands::prepare(&cli.command, &config)?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current step");
            let _ = cancel_tx.send(true);
        }
    });

    let container = DefaultAppContainer::new(&config, cancel_rx);
    container
        .ensure_tools()
        .context("ffmpeg and ffprobe must be installed and on PATH")?;

    match commands::execute(&container, prepared).await {
        Ok(result) => {
            commands::print_summary(&result, config.progress.format);
            if result.all_succeeded() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
        Err(DomainError::Cancelled) => {
            error!("Cancelled");
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e.into()),
    }
}
