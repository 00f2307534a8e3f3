//! DasNode - Data Availability Sampling simulator
//!
//! Composition root of the DasMesh workspace: configuration loading, the
//! simulated network and the round driver.

pub mod config;
pub mod driver;
pub mod network;

pub use config::Config;
pub use driver::{RoundDriver, RoundReport, Simulation, SimulationSummary};
pub use network::{SimNetwork, SimNode, BUILDER_INDEX};

use anyhow::{Context, Result};

/// Build a ready-to-run simulation from a validated configuration
pub fn build_simulation(config: &Config) -> Result<Simulation> {
    let das_config = config.das_config()?;
    let network = SimNetwork::new(
        das_config,
        config.network.validators,
        config.network.seed,
        config.transport.settings(),
    )
    .context("Failed to create network")?;

    Ok(Simulation::new(
        network,
        config.simulation.rounds,
        config.simulation.round_interval_ms,
    ))
}
