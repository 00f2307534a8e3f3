//! DasNode - Data Availability Sampling simulator

use anyhow::{Context, Result};
use clap::Parser;
use dasnode::{build_simulation, Config};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dasnode")]
#[command(about = "Simulate Data Availability Sampling over a DHT overlay")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "DASNODE_CONFIG")]
    config: Option<PathBuf>,

    /// Write a default configuration and exit
    #[arg(long)]
    init: bool,

    /// Number of rounds (overrides the configuration)
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Number of validators (overrides the configuration)
    #[arg(short, long)]
    validators: Option<usize>,

    /// Simulation seed (overrides the configuration)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level or filter directive
    #[arg(long, env = "DASNODE_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.init {
        let config = Config::create_default(args.config)?;
        println!(
            "Created default configuration at {}",
            config.config_path().display()
        );
        return Ok(());
    }

    let mut config = Config::load(args.config)?;
    if let Some(rounds) = args.rounds {
        config.simulation.rounds = rounds;
    }
    if let Some(validators) = args.validators {
        config.network.validators = validators;
    }
    if let Some(seed) = args.seed {
        config.network.seed = seed;
    }

    let level = args.log_level.unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, args.json_logs || config.logging.json);

    info!("Loaded configuration from {}", config.config_path().display());

    let mut simulation = build_simulation(&config)?;
    let summary = simulation.run().context("Simulation aborted")?;

    for report in &summary.reports {
        println!("Round {} (block {})", report.round, report.sequence_number);
        println!("{}", report);
    }
    for warning in &summary.trailing_warnings {
        warn!("{}", warning);
    }
    println!("{}", summary);

    Ok(())
}
