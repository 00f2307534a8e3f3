//! Per-node DAS protocol
//!
//! A node is reactive: it holds no phase, only its role, its stores and
//! the pending-request ledger. Every incoming envelope is validated, matched
//! on its kind and handled; outstanding requests past their deadline are
//! swept on the way out and held until the owner drains them.

use dasmesh_dht::{DhtError, NodeDirectory, NodeHandle, SampleStore};
use dasmesh_protocol::{region, Block, DasMessage, Envelope, Identifier, RequestId};
use dasmesh_routing::Transport;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::DasConfig;
use crate::error::{DasError, Result};
use crate::ledger::PendingRequests;

/// Role of a node, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Builder,
    Validator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Builder => write!(f, "builder"),
            Role::Validator => write!(f, "validator"),
        }
    }
}

/// Immutable per-node settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSettings {
    pub role: Role,

    /// Identifier of the node that originates blocks
    pub builder_address: Identifier,
}

/// Per-node protocol counters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeStats {
    pub announcements_received: u64,
    pub samples_stored: u64,
    pub assignments_received: u64,
    pub requests_sent: u64,
    pub responses_received: u64,
    pub requests_served: u64,
    pub store_misses: u64,
    pub timeouts: u64,
    pub retries: u64,
    pub late_responses: u64,
}

impl NodeStats {
    /// Add another node's counters to these
    pub fn merge(&mut self, other: &NodeStats) {
        self.announcements_received += other.announcements_received;
        self.samples_stored += other.samples_stored;
        self.assignments_received += other.assignments_received;
        self.requests_sent += other.requests_sent;
        self.responses_received += other.responses_received;
        self.requests_served += other.requests_served;
        self.store_misses += other.store_misses;
        self.timeouts += other.timeouts;
        self.retries += other.retries;
        self.late_responses += other.late_responses;
    }
}

/// What a node sees of the outside world while handling one event
pub struct Context<'a> {
    /// Current logical time
    pub now: u64,

    /// Outbound transport
    pub transport: &'a mut dyn Transport,
}

impl<'a> Context<'a> {
    pub fn new(now: u64, transport: &'a mut dyn Transport) -> Self {
        Context { now, transport }
    }
}

/// DAS state machine of one node
pub struct DasProtocol {
    config: Arc<DasConfig>,
    settings: NodeSettings,
    directory: Arc<dyn NodeDirectory>,

    /// Block samples (builder only)
    store: SampleStore,

    /// Outstanding get-sample requests (validator only)
    ledger: PendingRequests,

    /// Samples handed out by the driver
    assigned: HashSet<Identifier>,

    /// Payloads fetched from the builder, by requested id
    retrieved: HashMap<Identifier, Vec<u8>>,

    /// Requests given up on and not yet drained
    timeouts: Vec<DasError>,

    stats: NodeStats,
}

impl DasProtocol {
    /// Create a node from shared configuration and its own settings
    pub fn new(
        config: Arc<DasConfig>,
        settings: NodeSettings,
        directory: Arc<dyn NodeDirectory>,
    ) -> Self {
        DasProtocol {
            config,
            settings,
            directory,
            store: SampleStore::new(),
            ledger: PendingRequests::new(),
            assigned: HashSet::new(),
            retrieved: HashMap::new(),
            timeouts: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    pub fn node_id(&self) -> Identifier {
        self.directory.self_id()
    }

    pub fn role(&self) -> Role {
        self.settings.role
    }

    pub fn is_builder(&self) -> bool {
        self.settings.role == Role::Builder
    }

    pub fn builder_address(&self) -> Identifier {
        self.settings.builder_address
    }

    pub fn config(&self) -> &DasConfig {
        &self.config
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn pending_requests(&self) -> &PendingRequests {
        &self.ledger
    }

    /// Samples assigned to this node by the driver
    pub fn assigned_samples(&self) -> &HashSet<Identifier> {
        &self.assigned
    }

    /// Samples this node fetched from the builder
    pub fn retrieved_samples(&self) -> &HashMap<Identifier, Vec<u8>> {
        &self.retrieved
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Handle one delivered envelope.
    ///
    /// A missing or foreign address is a [`DasError::ProtocolViolation`] and
    /// nothing of the envelope is processed.
    pub fn process_event(&mut self, envelope: Envelope, ctx: &mut Context<'_>) -> Result<()> {
        let local = self.node_id();
        let source = envelope
            .validate_for(&local)
            .map_err(DasError::ProtocolViolation)?;

        debug!(
            "{} {} received {} from {}",
            self.settings.role,
            local,
            envelope.body.kind(),
            source
        );

        match envelope.body {
            DasMessage::BlockAnnouncement {
                block,
                network_size,
            } => self.handle_block_announcement(block, network_size, ctx)?,
            DasMessage::GetSampleRequest {
                request_id,
                sample_id,
            } => self.handle_get_sample(source, request_id, sample_id, ctx)?,
            DasMessage::GetSampleResponse {
                request_id,
                sample_id,
                payload,
            } => self.handle_sample_response(request_id, sample_id, &payload),
            DasMessage::SampleAssignment { sample_id } => self.handle_assignment(sample_id),
        }

        self.expire_requests(ctx)
    }

    /// Evict requests past their deadline, re-sending those the retry
    /// policy allows.
    ///
    /// Returns a [`DasError::RequestTimeout`] for every request given up on,
    /// including those found while handling earlier events.
    pub fn sweep_timeouts(&mut self, ctx: &mut Context<'_>) -> Result<Vec<DasError>> {
        self.expire_requests(ctx)?;
        Ok(self.take_timeouts())
    }

    /// Drain the timeouts recorded since the last drain
    pub fn take_timeouts(&mut self) -> Vec<DasError> {
        std::mem::take(&mut self.timeouts)
    }

    fn expire_requests(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let deadline = self.config.request_timeout_ms();
        let retry = self.config.retry();

        for (request_id, request) in self.ledger.expire(ctx.now, deadline) {
            if retry.allows_retry(request.attempts) {
                self.stats.retries += 1;
                debug!(
                    "Retrying sample {} (request {}, attempt {})",
                    request.sample_id,
                    request_id,
                    request.attempts + 1
                );
                self.request_sample(request.sample_id, request.attempts + 1, ctx)?;
                continue;
            }

            self.stats.timeouts += 1;
            let waited_ms = ctx.now.saturating_sub(request.sent_at);
            warn!(
                "{} gave up on sample {} after {} attempt(s) ({}ms)",
                self.node_id(),
                request.sample_id,
                request.attempts,
                waited_ms
            );
            self.timeouts.push(DasError::RequestTimeout {
                request_id,
                sample_id: request.sample_id,
                waited_ms,
            });
        }

        Ok(())
    }

    fn handle_block_announcement(
        &mut self,
        mut block: Block,
        network_size: usize,
        ctx: &mut Context<'_>,
    ) -> Result<()> {
        self.stats.announcements_received += 1;

        match self.settings.role {
            Role::Builder => {
                while block.has_next() {
                    let sample = block.next_sample()?;
                    if self.store.put(&sample, ctx.now) {
                        self.stats.samples_stored += 1;
                    }
                }
                debug!(
                    "Builder stored block {} ({} samples held)",
                    block.sequence_number(),
                    self.store.len()
                );
            }
            Role::Validator => {
                let radius = block
                    .compute_region_radius(self.config.replication_target(), network_size)
                    .map_err(|e| DasError::Configuration(e.to_string()))?;
                let local = self.node_id();

                while block.has_next() {
                    let sample = block.next_sample()?;
                    if let Some(axis) = region::matching_axis(&sample, &local, &radius) {
                        self.request_sample(sample.id_by(axis), 1, ctx)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_get_sample(
        &mut self,
        requester: Identifier,
        request_id: RequestId,
        sample_id: Identifier,
        ctx: &mut Context<'_>,
    ) -> Result<()> {
        if !self.is_builder() {
            warn!(
                "Validator {} ignored get-sample request {} from {}",
                self.node_id(),
                request_id,
                requester
            );
            return Ok(());
        }

        let payload = match self.store.get(&sample_id) {
            Some(entry) => entry.value.clone(),
            None => {
                self.stats.store_misses += 1;
                debug!("Builder has no sample {} (request {})", sample_id, request_id);
                return Ok(());
            }
        };

        self.stats.requests_served += 1;
        self.send(
            requester,
            DasMessage::GetSampleResponse {
                request_id,
                sample_id,
                payload,
            },
            ctx,
        )
    }

    fn handle_sample_response(
        &mut self,
        request_id: RequestId,
        sample_id: Identifier,
        payload: &[u8],
    ) {
        match self.ledger.remove(&request_id) {
            Some(request) => {
                if request.sample_id != sample_id {
                    warn!(
                        "Response {} carried sample {} but {} was requested",
                        request_id, sample_id, request.sample_id
                    );
                }
                self.stats.responses_received += 1;
                self.retrieved.insert(sample_id, payload.to_vec());
                trace!("Retrieved sample {} ({} bytes)", sample_id, payload.len());
            }
            None => {
                self.stats.late_responses += 1;
                debug!("Late or unknown response {} for {}", request_id, sample_id);
            }
        }
    }

    fn handle_assignment(&mut self, sample_id: Identifier) {
        self.stats.assignments_received += 1;
        self.assigned.insert(sample_id);
    }

    fn request_sample(
        &mut self,
        sample_id: Identifier,
        attempts: u32,
        ctx: &mut Context<'_>,
    ) -> Result<()> {
        let request_id = self.ledger.insert(sample_id, ctx.now, attempts);
        self.stats.requests_sent += 1;
        self.send(
            self.settings.builder_address,
            DasMessage::GetSampleRequest {
                request_id,
                sample_id,
            },
            ctx,
        )
    }

    fn send(
        &self,
        destination: Identifier,
        body: DasMessage,
        ctx: &mut Context<'_>,
    ) -> Result<()> {
        let local = self.node_id();
        let source_handle = self.resolve(&local)?;
        let destination_handle = self.resolve(&destination)?;

        let envelope = Envelope::new(ctx.now, local, destination, body);
        ctx.transport
            .send(&source_handle, &destination_handle, envelope)?;
        Ok(())
    }

    fn resolve(&self, node_id: &Identifier) -> Result<NodeHandle> {
        self.directory
            .resolve(node_id)
            .ok_or_else(|| DasError::Dht(DhtError::NodeNotFound(node_id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use dasmesh_dht::StaticDirectory;
    use dasmesh_protocol::{MappingFunction, ProtocolError};

    /// Transport that keeps every sent envelope
    #[derive(Default)]
    struct RecordingTransport {
        sent: Vec<(NodeHandle, NodeHandle, Envelope)>,
    }

    impl Transport for RecordingTransport {
        fn send(
            &mut self,
            source: &NodeHandle,
            destination: &NodeHandle,
            envelope: Envelope,
        ) -> dasmesh_routing::Result<()> {
            self.sent.push((*source, *destination, envelope));
            Ok(())
        }
    }

    struct Fixture {
        builder: DasProtocol,
        validator: DasProtocol,
        builder_id: Identifier,
        validator_id: Identifier,
    }

    fn fixture(replication_target: u32, retry: RetryPolicy) -> Fixture {
        let builder_id = Identifier::from_bytes([0x10; 32]);
        let validator_id = Identifier::from_bytes([0x20; 32]);

        let mut directory = StaticDirectory::new();
        directory.register(builder_id).unwrap();
        directory.register(validator_id).unwrap();
        let directory = Arc::new(directory);

        let config = Arc::new(
            DasConfig::new(replication_target, 4, MappingFunction::Linear, 100, retry).unwrap(),
        );

        let builder = DasProtocol::new(
            Arc::clone(&config),
            NodeSettings {
                role: Role::Builder,
                builder_address: builder_id,
            },
            Arc::new(directory.view_for(builder_id)),
        );
        let validator = DasProtocol::new(
            config,
            NodeSettings {
                role: Role::Validator,
                builder_address: builder_id,
            },
            Arc::new(directory.view_for(validator_id)),
        );

        Fixture {
            builder,
            validator,
            builder_id,
            validator_id,
        }
    }

    fn announcement(to: Identifier, network_size: usize) -> Envelope {
        Envelope::new(
            0,
            to,
            to,
            DasMessage::BlockAnnouncement {
                block: Block::new(4, 1),
                network_size,
            },
        )
    }

    #[test]
    fn test_builder_ingests_block() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        f.builder
            .process_event(announcement(f.builder_id, 2), &mut ctx)
            .unwrap();

        assert_eq!(f.builder.store().len(), 16);
        assert_eq!(f.builder.stats().samples_stored, 16);
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_validator_requests_samples_in_region() {
        // Target at least the network size saturates the radius
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        f.validator
            .process_event(announcement(f.validator_id, 2), &mut ctx)
            .unwrap();

        assert_eq!(transport.sent.len(), 16);
        assert_eq!(f.validator.pending_requests().len(), 16);
        assert_eq!(f.validator.stats().requests_sent, 16);
        assert!(f.validator.store().is_empty());

        for (source, destination, envelope) in &transport.sent {
            assert_eq!(source.node_id, f.validator_id);
            assert_eq!(destination.node_id, f.builder_id);
            assert!(matches!(
                envelope.body,
                DasMessage::GetSampleRequest { .. }
            ));
        }
    }

    #[test]
    fn test_zero_target_requests_nothing() {
        let mut f = fixture(0, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        f.validator
            .process_event(announcement(f.validator_id, 2), &mut ctx)
            .unwrap();

        assert!(transport.sent.is_empty());
        assert!(f.validator.pending_requests().is_empty());
    }

    #[test]
    fn test_empty_network_is_configuration_error() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        let result = f
            .validator
            .process_event(announcement(f.validator_id, 0), &mut ctx);
        assert!(matches!(result, Err(DasError::Configuration(_))));
    }

    #[test]
    fn test_request_response_round_trip() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();

        {
            let mut ctx = Context::new(0, &mut transport);
            f.builder
                .process_event(announcement(f.builder_id, 2), &mut ctx)
                .unwrap();
            f.validator
                .process_event(announcement(f.validator_id, 2), &mut ctx)
                .unwrap();
        }

        let requests: Vec<Envelope> = transport.sent.drain(..).map(|(_, _, e)| e).collect();
        {
            let mut ctx = Context::new(5, &mut transport);
            for request in requests {
                f.builder.process_event(request, &mut ctx).unwrap();
            }
        }
        assert_eq!(f.builder.stats().requests_served, 16);

        let responses: Vec<Envelope> = transport.sent.drain(..).map(|(_, _, e)| e).collect();
        assert_eq!(responses.len(), 16);
        {
            let mut ctx = Context::new(10, &mut transport);
            for response in responses {
                f.validator.process_event(response, &mut ctx).unwrap();
            }
        }

        assert!(f.validator.pending_requests().is_empty());
        assert_eq!(f.validator.retrieved_samples().len(), 16);
        assert_eq!(f.validator.stats().responses_received, 16);

        for sample in Block::new(4, 1).samples() {
            let payload = &f.validator.retrieved_samples()[&sample.id_by_row()];
            assert_eq!(payload.as_slice(), sample.payload());
        }
    }

    #[test]
    fn test_column_request_is_answered_with_that_cell() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);
        f.builder
            .process_event(announcement(f.builder_id, 2), &mut ctx)
            .unwrap();

        let block = Block::new(4, 1);
        let cell = block
            .samples()
            .find(|s| s.row() == 1 && s.column() == 2)
            .unwrap();
        let transposed = block
            .samples()
            .find(|s| s.row() == 2 && s.column() == 1)
            .unwrap();

        let request = Envelope::new(
            0,
            f.validator_id,
            f.builder_id,
            DasMessage::GetSampleRequest {
                request_id: RequestId::new(7),
                sample_id: cell.id_by_column(),
            },
        );
        f.builder.process_event(request, &mut ctx).unwrap();

        assert_eq!(transport.sent.len(), 1);
        match &transport.sent[0].2.body {
            DasMessage::GetSampleResponse {
                sample_id, payload, ..
            } => {
                assert_eq!(*sample_id, cell.id_by_column());
                assert_eq!(payload.as_slice(), cell.payload());
                assert_ne!(payload.as_slice(), transposed.payload());
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sample_is_store_miss() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        let request = Envelope::new(
            0,
            f.validator_id,
            f.builder_id,
            DasMessage::GetSampleRequest {
                request_id: RequestId::new(0),
                sample_id: Identifier::from_bytes([0xEE; 32]),
            },
        );
        f.builder.process_event(request, &mut ctx).unwrap();

        assert_eq!(f.builder.stats().store_misses, 1);
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_timeout_without_retry() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        {
            let mut ctx = Context::new(0, &mut transport);
            f.validator
                .process_event(announcement(f.validator_id, 2), &mut ctx)
                .unwrap();
        }

        let mut ctx = Context::new(100, &mut transport);
        let timeouts = f.validator.sweep_timeouts(&mut ctx).unwrap();

        assert_eq!(timeouts.len(), 16);
        assert!(timeouts.iter().all(|e| !e.is_fatal()));
        assert!(f.validator.pending_requests().is_empty());
        assert_eq!(f.validator.stats().timeouts, 16);
    }

    #[test]
    fn test_timeout_with_retry() {
        let mut f = fixture(2, RetryPolicy::Attempts { max: 2 });
        let mut transport = RecordingTransport::default();
        {
            let mut ctx = Context::new(0, &mut transport);
            f.validator
                .process_event(announcement(f.validator_id, 2), &mut ctx)
                .unwrap();
        }

        {
            let mut ctx = Context::new(100, &mut transport);
            assert!(f.validator.sweep_timeouts(&mut ctx).unwrap().is_empty());
        }
        assert_eq!(f.validator.stats().retries, 16);
        assert_eq!(f.validator.pending_requests().len(), 16);
        assert_eq!(transport.sent.len(), 32);

        let mut ctx = Context::new(200, &mut transport);
        assert_eq!(f.validator.sweep_timeouts(&mut ctx).unwrap().len(), 16);
        assert_eq!(f.validator.stats().timeouts, 16);
    }

    #[test]
    fn test_timeouts_found_while_handling_event_are_kept() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        {
            let mut ctx = Context::new(0, &mut transport);
            f.validator
                .process_event(announcement(f.validator_id, 2), &mut ctx)
                .unwrap();
        }

        // any event past the deadline expires the outstanding requests
        let mut ctx = Context::new(150, &mut transport);
        let assignment = Envelope::new(
            150,
            f.builder_id,
            f.validator_id,
            DasMessage::SampleAssignment {
                sample_id: Identifier::from_bytes([0x33; 32]),
            },
        );
        f.validator.process_event(assignment, &mut ctx).unwrap();
        assert!(f.validator.pending_requests().is_empty());
        assert_eq!(f.validator.stats().timeouts, 16);

        let timeouts = f.validator.take_timeouts();
        assert_eq!(timeouts.len(), 16);
        assert!(timeouts.iter().all(|e| matches!(
            e,
            DasError::RequestTimeout { waited_ms: 150, .. }
        )));
        assert!(f.validator.take_timeouts().is_empty());
        assert!(f.validator.sweep_timeouts(&mut ctx).unwrap().is_empty());
    }

    #[test]
    fn test_sweep_also_returns_buffered_timeouts() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        {
            let mut ctx = Context::new(0, &mut transport);
            f.validator
                .process_event(announcement(f.validator_id, 2), &mut ctx)
                .unwrap();
        }
        {
            let mut ctx = Context::new(100, &mut transport);
            let response = Envelope::new(
                100,
                f.builder_id,
                f.validator_id,
                DasMessage::GetSampleResponse {
                    request_id: RequestId::new(99),
                    sample_id: f.builder_id,
                    payload: vec![0],
                },
            );
            f.validator.process_event(response, &mut ctx).unwrap();
        }

        let mut ctx = Context::new(100, &mut transport);
        assert_eq!(f.validator.sweep_timeouts(&mut ctx).unwrap().len(), 16);
        assert_eq!(f.validator.stats().timeouts, 16);
    }

    #[test]
    fn test_late_response_is_counted() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        let response = Envelope::new(
            0,
            f.builder_id,
            f.validator_id,
            DasMessage::GetSampleResponse {
                request_id: RequestId::new(42),
                sample_id: f.builder_id,
                payload: vec![1, 2, 3],
            },
        );
        f.validator.process_event(response, &mut ctx).unwrap();

        assert_eq!(f.validator.stats().late_responses, 1);
        assert!(f.validator.retrieved_samples().is_empty());
    }

    #[test]
    fn test_assignment_recorded() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);
        let sample_id = Identifier::from_bytes([0x33; 32]);

        let assignment = Envelope::new(
            0,
            f.builder_id,
            f.validator_id,
            DasMessage::SampleAssignment { sample_id },
        );
        f.validator.process_event(assignment, &mut ctx).unwrap();

        assert!(f.validator.assigned_samples().contains(&sample_id));
        assert_eq!(f.validator.stats().assignments_received, 1);
    }

    #[test]
    fn test_malformed_envelope_is_violation() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        let mut envelope = announcement(f.builder_id, 2);
        envelope.source = None;

        let result = f.builder.process_event(envelope, &mut ctx);
        assert_eq!(
            result,
            Err(DasError::ProtocolViolation(ProtocolError::MissingField(
                "source"
            )))
        );
        assert!(f.builder.store().is_empty());
    }

    #[test]
    fn test_misrouted_envelope_is_violation() {
        let mut f = fixture(2, RetryPolicy::Never);
        let mut transport = RecordingTransport::default();
        let mut ctx = Context::new(0, &mut transport);

        let result = f
            .builder
            .process_event(announcement(f.validator_id, 2), &mut ctx);
        assert!(matches!(
            result,
            Err(DasError::ProtocolViolation(ProtocolError::Misrouted { .. }))
        ));
    }

    #[test]
    fn test_stats_merge() {
        let mut total = NodeStats::default();
        let one = NodeStats {
            requests_sent: 3,
            timeouts: 1,
            ..Default::default()
        };
        total.merge(&one);
        total.merge(&one);
        assert_eq!(total.requests_sent, 6);
        assert_eq!(total.timeouts, 2);
    }
}
