//! Calculator gRPC server binary.
//!
//! Configuration is layered (see `calckit_bootstrap::config`):
//! 1. Built-in defaults
//! 2. YAML file from `--config`
//! 3. Environment variables with the `CALCULATOR__` prefix
//! 4. Command line overrides (`--listen`, `-v`)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use calckit_bootstrap::config::render;
use calckit_bootstrap::{init_logging, level_for_verbosity, load_layered, wait_for_shutdown};
use calculator::config::ENV_PREFIX;
use calculator::{CalculatorConfig, Service, server};
use clap::{Parser, Subcommand};

/// Calculator gRPC service
#[derive(Parser)]
#[command(name = "calculator-server", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `listen_addr`
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server (default)
    Run,
    /// Validate configuration and exit
    Check,
}

fn load_config(cli: &Cli) -> Result<CalculatorConfig> {
    let mut config = load_layered(
        &CalculatorConfig::default(),
        cli.config.as_deref(),
        ENV_PREFIX,
    )?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    config.logging.level = level_for_verbosity(cli.verbose, &config.logging.level);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.print_config {
        println!("{}", render(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Check => {
            println!("configuration OK (listen_addr = {})", config.listen_addr);
            Ok(())
        }
        Commands::Run => run(config).await,
    }
}

async fn run(config: CalculatorConfig) -> Result<()> {
    let logging = init_logging(&config.logging, "calculator").context("failed to init logging")?;
    let logger = logging.logger();

    let service = Arc::new(Service::new(logger.clone()));
    let listener = server::bind(config.listen_addr).await?;

    let shutdown_logger = logger.clone();
    let shutdown = async move {
        if let Err(e) = wait_for_shutdown(&shutdown_logger).await {
            tracing::error!(error = %e, "signal handling failed, shutting down");
        }
    };

    server::serve(listener, service, shutdown).await
}
