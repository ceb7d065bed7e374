//! # TP API Binary
//!
//! Serves the simulated production cell over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Defaults (localhost:8080, 5 s request timeout)
//! tp_api
//!
//! # Config file, environment overrides on top
//! API_ADDRESS=0.0.0.0:8080 API_TIMEOUT=10s tp_api --config config/tp.toml
//! ```

use clap::Parser;
use std::path::PathBuf;
use tp_api::{ApiConfig, router};
use tp_common::prelude::*;
use tp_model::Service;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// TP API - HTTP surface of the production cell twin
#[derive(Parser, Debug)]
#[command(name = "tp_api")]
#[command(version)]
#[command(about = "HTTP server for the simulated production cell")]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (overrides the configured level)
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args);

    let level = match &config {
        Ok(config) => config.shared.log_level,
        Err(_) => LogLevel::Info,
    };
    setup_tracing(&args, level);

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        error!("API startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<ApiConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => ApiConfig::load(path)?,
        None => ApiConfig::default(),
    };
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

async fn run(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "TP API v{} starting as {}",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    let service = Service::new(config.cell.clone())?;
    let app = router(service.clone(), config.api.timeout());

    let listener = tokio::net::TcpListener::bind(&config.api.address).await?;
    info!(
        "Listening on {} (request timeout {:?})",
        listener.local_addr()?,
        config.api.timeout()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.shutdown();
    info!("TP API shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
