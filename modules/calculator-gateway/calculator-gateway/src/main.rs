//! Calculator gateway binary.
//!
//! Configuration is layered (see `calckit_bootstrap::config`):
//! 1. Built-in defaults
//! 2. YAML file from `--config`
//! 3. Environment variables with the `GATEWAY__` prefix
//! 4. Command line overrides (`--bind`, `--calculator-uri`, `--local`, `-v`)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use calckit_bootstrap::config::render;
use calckit_bootstrap::{init_logging, level_for_verbosity, load_layered, wait_for_shutdown};
use calculator_gateway::config::ENV_PREFIX;
use calculator_gateway::{CalculatorMode, GatewayConfig, Service, server};
use clap::{Parser, Subcommand};

/// JSON gateway for the calculator service
#[derive(Parser)]
#[command(name = "calculator-gateway", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP bind address, overrides `bind_addr`
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Calculator gRPC endpoint, overrides `calculator.uri`
    #[arg(long)]
    calculator_uri: Option<String>,

    /// Run the calculator in-process instead of calling it over gRPC
    #[arg(long)]
    local: bool,

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
    /// Run the gateway (default)
    Run,
    /// Validate configuration and exit
    Check,
}

fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let mut config = load_layered(&GatewayConfig::default(), cli.config.as_deref(), ENV_PREFIX)?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(uri) = &cli.calculator_uri {
        config.calculator.uri.clone_from(uri);
    }
    if cli.local {
        config.calculator.mode = CalculatorMode::Local;
    }
    config.logging.level = level_for_verbosity(cli.verbose, &config.logging.level);
    config.validate()?;
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
            let uri: http::Uri = config
                .calculator
                .uri
                .parse()
                .with_context(|| format!("invalid calculator.uri '{}'", config.calculator.uri))?;
            println!(
                "configuration OK (bind_addr = {}, calculator = {:?} {uri})",
                config.bind_addr, config.calculator.mode
            );
            Ok(())
        }
        Commands::Run => run(config).await,
    }
}

async fn run(config: GatewayConfig) -> Result<()> {
    let logging =
        init_logging(&config.logging, "calculator-gateway").context("failed to init logging")?;
    let logger = logging.logger();

    let calculator = server::build_calculator(&config.calculator, &logger).await?;
    let service = Arc::new(Service::new(
        calculator,
        config.calculator.rpc_timeout(),
        logger.clone(),
    ));
    let router = server::build_router(&config, service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {}", config.bind_addr))?;

    let shutdown = async move {
        if let Err(e) = wait_for_shutdown(&logger).await {
            tracing::error!(error = %e, "signal handling failed, shutting down");
        }
    };

    server::serve(listener, router, shutdown).await
}
