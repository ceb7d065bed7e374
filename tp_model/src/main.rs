//! # TP Scenario Binary
//!
//! Runs one scripted scenario against an in-process cell and prints the
//! final cell snapshot as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Full line with default geometry
//! tp_scenario --scenario full-line
//!
//! # Custom geometry, verbose logging
//! tp_scenario --scenario inspect --config config/cell.toml -v
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tp_common::prelude::*;
use tp_model::{Driver, DriverConfig, Service};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Scripted sequence to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// New puck from start onto the carousel
    Carousel,
    /// New puck onto the carousel, rotated under inspection
    Inspect,
    /// Start to sorting through every station
    FullLine,
}

/// TP scenario runner
#[derive(Parser, Debug)]
#[command(name = "tp_scenario")]
#[command(version)]
#[command(about = "Run a scripted scenario against the simulated cell")]
struct Args {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value_t = Scenario::FullLine)]
    scenario: Scenario,

    /// Cell geometry file (TOML, CellConfig fields at top level)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(&args);

    let runtime = tokio::runtime::Runtime::new()?;
    if let Err(e) = runtime.block_on(run(&args)) {
        error!("Scenario failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => CellConfig::load(path)?,
        None => CellConfig::default(),
    };
    config.validate()?;

    let service = Service::new(config)?;
    let driver = Driver::new(service.clone(), DriverConfig::default());

    info!("Running scenario {:?}", args.scenario);
    let outcome = match args.scenario {
        Scenario::Carousel => driver.move_puck_to_carousel().await,
        Scenario::Inspect => driver.inspect_new_puck().await,
        Scenario::FullLine => driver.run_full_line().await,
    };
    let snapshot = service.snapshot();
    service.shutdown();

    let puck = outcome?;
    info!("Scenario done with {} puck", puck.color);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
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
