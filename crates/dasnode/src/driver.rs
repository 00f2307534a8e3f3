//! Round driver: block production, region assignment and coverage reports

use dasmesh_das::{DasError, NodeStats, Result};
use dasmesh_protocol::{matching_axis, Block, DasMessage, Distance, Envelope};
use dasmesh_routing::TransportStats;
use std::fmt;
use tracing::{info, warn};

use crate::network::SimNetwork;

/// Outcome of one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    /// 1-based round number
    pub round: u32,
    pub sequence_number: u64,
    pub radius: Distance,
    /// Samples within the region of at least one node
    pub samples_covered: usize,
    pub total_samples: usize,
    /// Direct assignments dispatched, one per (node, sample) match
    pub total_assignments: usize,
    /// Non-fatal conditions seen during the round, including request
    /// timeouts nodes found while it ran
    pub warnings: Vec<DasError>,
}

impl RoundReport {
    /// Samples no node is responsible for
    pub fn deficit(&self) -> usize {
        self.total_samples - self.samples_covered
    }

    pub fn is_fully_covered(&self) -> bool {
        self.samples_covered == self.total_samples
    }

    /// The coverage warning of this round, if any
    pub fn coverage_gap(&self) -> Option<&DasError> {
        self.warnings
            .iter()
            .find(|warning| matches!(warning, DasError::CoverageGap { .. }))
    }
}

impl fmt::Display for RoundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} samples out of {} samples are within a node's region",
            self.samples_covered, self.total_samples
        )?;
        write!(f, "{} total samples distributed", self.total_assignments)
    }
}

/// Creates one block per round and hands it to the network
#[derive(Debug)]
pub struct RoundDriver {
    next_sequence: u64,
    rounds_executed: u32,
}

impl RoundDriver {
    pub fn new() -> Self {
        RoundDriver {
            next_sequence: 1,
            rounds_executed: 0,
        }
    }

    pub fn rounds_executed(&self) -> u32 {
        self.rounds_executed
    }

    /// Run one round at the network's current time.
    ///
    /// Assignments and announcements are scheduled, not delivered; drive the
    /// network to let nodes react.
    pub fn execute_round(&mut self, network: &mut SimNetwork) -> Result<RoundReport> {
        let mut warnings = network.sweep_timeouts()?;

        let config = network.config().clone();
        let sequence_number = self.next_sequence;
        let mut block = Block::with_mapping(config.block_dimension(), sequence_number, config.mapping());

        let network_size = network.size();
        let radius = block
            .compute_region_radius(config.replication_target(), network_size)
            .map_err(|e| DasError::Configuration(e.to_string()))?;

        self.next_sequence += 1;
        self.rounds_executed += 1;

        let now = network.now();
        let builder_id = network.builder().handle.node_id;
        let targets: Vec<_> = network
            .nodes()
            .iter()
            .filter(|node| node.up)
            .map(|node| node.handle)
            .collect();

        let mut samples_covered = 0;
        let mut total_assignments = 0;
        for sample in block.samples() {
            let mut covered = false;
            for target in &targets {
                if let Some(axis) = matching_axis(&sample, &target.node_id, &radius) {
                    network.schedule(
                        0,
                        *target,
                        Envelope::new(
                            now,
                            builder_id,
                            target.node_id,
                            DasMessage::SampleAssignment {
                                sample_id: sample.id_by(axis),
                            },
                        ),
                    );
                    total_assignments += 1;
                    covered = true;
                }
            }
            if covered {
                samples_covered += 1;
            }
        }

        // Builder comes first so it ingests before any request arrives
        block.init_iterator();
        for target in &targets {
            network.schedule(
                0,
                *target,
                Envelope::new(
                    now,
                    builder_id,
                    target.node_id,
                    DasMessage::BlockAnnouncement {
                        block: block.clone(),
                        network_size,
                    },
                ),
            );
        }

        let total_samples = block.num_samples();
        if samples_covered < total_samples {
            let gap = DasError::CoverageGap {
                missing: total_samples - samples_covered,
                total: total_samples,
            };
            warn!("Round {}: {}", self.rounds_executed, gap);
            warnings.push(gap);
        }

        let report = RoundReport {
            round: self.rounds_executed,
            sequence_number,
            radius,
            samples_covered,
            total_samples,
            total_assignments,
            warnings,
        };
        info!(
            "Round {} (block {}, radius {}): {} of {} samples covered, {} assignments",
            report.round,
            report.sequence_number,
            report.radius,
            report.samples_covered,
            report.total_samples,
            report.total_assignments
        );

        Ok(report)
    }
}

impl Default for RoundDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub reports: Vec<RoundReport>,
    /// Counters of all nodes added together
    pub node_stats: NodeStats,
    pub transport_stats: TransportStats,
    /// Timeouts found after the last round
    pub trailing_warnings: Vec<DasError>,
}

impl SimulationSummary {
    pub fn samples_covered(&self) -> usize {
        self.reports.iter().map(|r| r.samples_covered).sum()
    }

    pub fn total_samples(&self) -> usize {
        self.reports.iter().map(|r| r.total_samples).sum()
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} rounds, {} of {} samples covered",
            self.reports.len(),
            self.samples_covered(),
            self.total_samples()
        )?;
        writeln!(
            f,
            "requests: {} sent, {} served, {} answered, {} timed out, {} retried",
            self.node_stats.requests_sent,
            self.node_stats.requests_served,
            self.node_stats.responses_received,
            self.node_stats.timeouts,
            self.node_stats.retries
        )?;
        write!(
            f,
            "transport: {} sent, {} dropped, {} delivered, {} bytes",
            self.transport_stats.messages_sent,
            self.transport_stats.messages_dropped,
            self.transport_stats.messages_delivered,
            self.transport_stats.bytes_sent
        )
    }
}

/// A configured number of rounds over one network
pub struct Simulation {
    network: SimNetwork,
    driver: RoundDriver,
    rounds: u32,
    round_interval_ms: u64,
}

impl Simulation {
    pub fn new(network: SimNetwork, rounds: u32, round_interval_ms: u64) -> Self {
        Simulation {
            network,
            driver: RoundDriver::new(),
            rounds,
            round_interval_ms,
        }
    }

    pub fn network(&self) -> &SimNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut SimNetwork {
        &mut self.network
    }

    /// Execute every round, letting the network run for one interval after each
    pub fn run(&mut self) -> Result<SimulationSummary> {
        let mut reports = Vec::with_capacity(self.rounds as usize);

        for _ in 0..self.rounds {
            let mut report = self.driver.execute_round(&mut self.network)?;
            let deadline = self.network.now().saturating_add(self.round_interval_ms);
            self.network.run_until(deadline)?;
            report.warnings.extend(self.network.take_timeouts());
            reports.push(report);
        }

        let trailing_warnings = self.network.sweep_timeouts()?;

        Ok(SimulationSummary {
            reports,
            node_stats: self.network.aggregate_stats(),
            transport_stats: self.network.transport_stats().clone(),
            trailing_warnings,
        })
    }
}
