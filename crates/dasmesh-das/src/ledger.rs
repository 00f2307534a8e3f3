//! Pending-request ledger

use dasmesh_protocol::{Identifier, RequestId};
use std::collections::BTreeMap;

/// An outstanding get-sample request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Identifier the request asked for
    pub sample_id: Identifier,

    /// Logical time of the latest dispatch
    pub sent_at: u64,

    /// Number of times the request has been sent
    pub attempts: u32,
}

impl PendingRequest {
    /// Whether the request has waited at least `deadline` ms at `now`
    pub fn is_expired(&self, now: u64, deadline: u64) -> bool {
        now.saturating_sub(self.sent_at) >= deadline
    }
}

/// Outstanding requests of one node, keyed by a per-node request counter
#[derive(Debug, Default)]
pub struct PendingRequests {
    entries: BTreeMap<RequestId, PendingRequest>,
    next_id: RequestId,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a dispatched request and return its id
    pub fn insert(&mut self, sample_id: Identifier, sent_at: u64, attempts: u32) -> RequestId {
        let request_id = self.next_id;
        self.next_id = request_id.next();
        self.entries.insert(
            request_id,
            PendingRequest {
                sample_id,
                sent_at,
                attempts,
            },
        );
        request_id
    }

    pub fn get(&self, request_id: &RequestId) -> Option<&PendingRequest> {
        self.entries.get(request_id)
    }

    /// Remove a request answered by a response
    pub fn remove(&mut self, request_id: &RequestId) -> Option<PendingRequest> {
        self.entries.remove(request_id)
    }

    /// Evict every request that has waited at least `deadline` ms.
    ///
    /// Evicted entries are returned in request-id order.
    pub fn expire(&mut self, now: u64, deadline: u64) -> Vec<(RequestId, PendingRequest)> {
        let expired: Vec<RequestId> = self
            .entries
            .iter()
            .filter(|(_, request)| request.is_expired(now, deadline))
            .map(|(id, _)| *id)
            .collect();

        expired
            .into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|request| (id, request)))
            .collect()
    }
}
