//! # eden
//!
//! ECS Dynamic Environment Manager command-line entry point.
//!
//! Exit codes: 0 on success, 1 on any reported failure, 130 when interrupted.

use anyhow::{Context, Result};
use clap::Parser;
use eden::cli::{self, Cli};
use eden::config::Settings;
use eden::observability::init_logging;
use std::process::ExitCode;
use tracing::{error, warn};

/// Exit status of a command cancelled by Ctrl+C
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::from_env();
    init_logging(cli.command.common().verbose, settings.log_color);

    tokio::select! {
        result = execute(cli, &settings) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e:#}");
                ExitCode::FAILURE
            }
        },
        () = interrupted() => {
            warn!("Interrupted, remote operations may not have completed");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn execute(cli: Cli, settings: &Settings) -> Result<()> {
    let kind = cli.command.kind();
    cli::run(cli, settings)
        .await
        .with_context(|| format!("eden {} failed", kind.name()))
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
