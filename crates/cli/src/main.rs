//! Portal CLI - dashboard session from the terminal

mod commands;
mod config;
mod terminal;

use anyhow::Result;
use clap::Parser;
use commands::Commands;
use portal_core::StateDir;
use portal_core::logging::init_tracing;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Sign in to the Portal dashboard API and manage the stored session")]
#[command(version)]
struct Cli {
    /// Set logging level (any `RUST_LOG` style filter)
    #[arg(short = 'l', long, global = true)]
    log_level: Option<String>,

    /// Configuration file (defaults to <config dir>/portal.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Directory for configuration and stored session data
    #[arg(short = 'd', long, global = true, env = "PORTAL_STATE_DIR")]
    data_dir: Option<PathBuf>,

    /// API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Timeout for network operations in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let overrides = config::Overrides {
        config: cli.config,
        base_url: cli.base_url,
        log_level: cli.log_level,
    };
    let state_dir = StateDir::from_option(cli.data_dir.clone());
    let config = config::load_config(&overrides, &state_dir)?;
    init_tracing(&config.logging)?;

    let state_dir = match (cli.data_dir, &config.storage.data_dir) {
        (None, Some(configured)) => StateDir::with_override(configured),
        _ => state_dir,
    };

    info!("Starting Portal CLI");

    // A timed-out command drops its pending request; nothing is persisted for it
    let outcome = if cli.timeout == 0 {
        cli.command.execute(config, &state_dir).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(config, &state_dir)).await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    };

    match outcome {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {e}");
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    }
}
