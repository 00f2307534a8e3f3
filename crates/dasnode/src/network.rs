//! Simulated network: one builder plus validators over a lossy transport

use dasmesh_das::{
    Context, DasConfig, DasError, DasProtocol, NodeSettings, NodeStats, Result, Role,
};
use dasmesh_dht::{DhtError, NodeHandle, StaticDirectory, UniformIdGenerator};
use dasmesh_protocol::Envelope;
use dasmesh_routing::{TransportSettings, TransportStats, UnreliableTransport};
use std::sync::Arc;
use tracing::{debug, info};

/// Index of the builder in every network
pub const BUILDER_INDEX: usize = 0;

/// A node of the simulated network
pub struct SimNode {
    pub handle: NodeHandle,
    /// Down nodes are skipped by the driver and lose their deliveries
    pub up: bool,
    pub protocol: DasProtocol,
}

pub struct SimNetwork {
    config: Arc<DasConfig>,
    directory: Arc<StaticDirectory>,
    nodes: Vec<SimNode>,
    transport: UnreliableTransport,
}

impl SimNetwork {
    /// Create a builder plus `validators` validator nodes.
    ///
    /// Node identifiers and transport randomness both derive from `seed`.
    pub fn new(
        config: Arc<DasConfig>,
        validators: usize,
        seed: u64,
        transport: TransportSettings,
    ) -> Result<Self> {
        let mut generator = UniformIdGenerator::new(seed);
        let mut directory = StaticDirectory::new();
        for _ in 0..=validators {
            directory.register(generator.generate())?;
        }
        let directory = Arc::new(directory);

        let builder_address = directory.handles()[BUILDER_INDEX].node_id;
        let nodes = directory
            .handles()
            .iter()
            .map(|handle| {
                let role = if handle.index == BUILDER_INDEX {
                    Role::Builder
                } else {
                    Role::Validator
                };
                SimNode {
                    handle: *handle,
                    up: true,
                    protocol: DasProtocol::new(
                        Arc::clone(&config),
                        NodeSettings {
                            role,
                            builder_address,
                        },
                        Arc::new(directory.view_for(handle.node_id)),
                    ),
                }
            })
            .collect::<Vec<_>>();

        let transport = UnreliableTransport::new(transport, seed.wrapping_add(1))?;

        info!(
            "Created network with 1 builder and {} validators (builder {})",
            validators, builder_address
        );

        Ok(SimNetwork {
            config,
            directory,
            nodes,
            transport,
        })
    }

    pub fn config(&self) -> &Arc<DasConfig> {
        &self.config
    }

    pub fn directory(&self) -> &StaticDirectory {
        &self.directory
    }

    /// Number of nodes, builder included
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Current logical time
    pub fn now(&self) -> u64 {
        self.transport.now()
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&SimNode> {
        self.nodes.get(index)
    }

    pub fn builder(&self) -> &SimNode {
        &self.nodes[BUILDER_INDEX]
    }

    /// Take a node down or bring it back up
    pub fn set_up(&mut self, index: usize, up: bool) -> Result<()> {
        let node = self
            .nodes
            .get_mut(index)
            .ok_or_else(|| DhtError::NodeNotFound(format!("index {}", index)))?;
        node.up = up;
        debug!("{} is now {}", node.handle, if up { "up" } else { "down" });
        Ok(())
    }

    /// Inject a message, bypassing the loss model
    pub fn schedule(&mut self, delay: u64, destination: NodeHandle, envelope: Envelope) {
        self.transport.schedule(delay, destination, envelope);
    }

    /// Messages still in flight
    pub fn pending_events(&self) -> usize {
        self.transport.pending()
    }

    /// Deliver every event due no later than `deadline`, then move the clock
    /// to `deadline`.
    ///
    /// Returns the number of events handled. The first error raised by a
    /// node stops the run.
    pub fn run_until(&mut self, deadline: u64) -> Result<usize> {
        let processed = self.deliver(deadline)?;
        self.transport.advance_to(deadline);
        Ok(processed)
    }

    /// Deliver events until none are left
    pub fn run_to_quiescence(&mut self) -> Result<usize> {
        self.deliver(u64::MAX)
    }

    /// Sweep the request ledgers of every live node.
    ///
    /// The result also holds every timeout nodes found while handling events
    /// since the last drain, down nodes included.
    pub fn sweep_timeouts(&mut self) -> Result<Vec<DasError>> {
        let now = self.transport.now();
        let mut timeouts = Vec::new();
        for node in self.nodes.iter_mut() {
            if node.up {
                let mut ctx = Context::new(now, &mut self.transport);
                timeouts.extend(node.protocol.sweep_timeouts(&mut ctx)?);
            } else {
                timeouts.extend(node.protocol.take_timeouts());
            }
        }
        Ok(timeouts)
    }

    /// Drain the timeouts nodes found while handling events
    pub fn take_timeouts(&mut self) -> Vec<DasError> {
        self.nodes
            .iter_mut()
            .flat_map(|node| node.protocol.take_timeouts())
            .collect()
    }

    /// Counters of all nodes added together
    pub fn aggregate_stats(&self) -> NodeStats {
        let mut total = NodeStats::default();
        for node in &self.nodes {
            total.merge(node.protocol.stats());
        }
        total
    }

    pub fn transport_stats(&self) -> &TransportStats {
        self.transport.stats()
    }

    fn deliver(&mut self, deadline: u64) -> Result<usize> {
        let mut processed = 0;

        while let Some(event) = self.transport.next_delivery(deadline) {
            let destination = event.payload.destination;
            let node = self
                .nodes
                .get_mut(destination.index)
                .ok_or_else(|| DhtError::NodeNotFound(destination.to_string()))?;

            if !node.up {
                self.transport.record_undeliverable();
                debug!(
                    "Lost {} to {}: node is down",
                    event.payload.envelope.body.kind(),
                    destination
                );
                continue;
            }

            let mut ctx = Context::new(event.time, &mut self.transport);
            node.protocol.process_event(event.payload.envelope, &mut ctx)?;
            processed += 1;
        }

        Ok(processed)
    }
}
