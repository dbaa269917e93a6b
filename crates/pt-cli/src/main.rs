use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use pt_core::OptimalThreshold;
use tracing_subscriber::EnvFilter;

use pt_cli::commands::{classify, count, export, recreate, scan, stats};
use pt_cli::{Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support; failed submissions are
    // warnings, so show those even without RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Logs go to stderr so station output on stdout stays clean
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Scan { record_on_exit }) => {
            scan::run(&config, *record_on_exit).await?;
        }
        Some(Commands::Classify { elapsed, optimal }) => {
            let threshold = match optimal {
                Some(seconds) => OptimalThreshold::new(*seconds)?,
                None => config
                    .threshold()
                    .context("invalid optimal_seconds in configuration")?,
            };
            classify::run(&mut stdout, *elapsed, threshold)?;
        }
        Some(Commands::Count) => {
            let client = config.client()?;
            count::run(&mut stdout, &client).await?;
        }
        Some(Commands::Stats { json }) => {
            let client = config.client()?;
            stats::run(&mut stdout, &client, *json).await?;
        }
        Some(Commands::Recreate) => {
            let client = config.client()?;
            recreate::run(&mut stdout, &client).await?;
        }
        Some(Commands::Export { output }) => {
            let client = config.client()?;
            export::run(&mut stdout, &client, output.as_deref()).await?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
