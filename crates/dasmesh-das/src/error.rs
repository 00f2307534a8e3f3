//! DAS error types

use dasmesh_protocol::{Identifier, ProtocolError, RequestId};
use thiserror::Error;

/// DAS-specific errors.
///
/// `Configuration` and `ProtocolViolation` abort the unit of work that hit
/// them. `CoverageGap` and `RequestTimeout` are reported, never raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DasError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(ProtocolError),

    #[error("Coverage gap: {missing} of {total} samples are not within a region of a peer")]
    CoverageGap { missing: usize, total: usize },

    #[error("Request {request_id} for sample {sample_id} timed out after {waited_ms}ms")]
    RequestTimeout {
        request_id: RequestId,
        sample_id: Identifier,
        waited_ms: u64,
    },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("DHT error: {0}")]
    Dht(#[from] dasmesh_dht::DhtError),

    #[error("Routing error: {0}")]
    Routing(#[from] dasmesh_routing::RoutingError),
}

impl DasError {
    /// Whether the error halts the work it came from
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DasError::CoverageGap { .. } | DasError::RequestTimeout { .. }
        )
    }
}

/// Result type for DAS operations
pub type Result<T> = std::result::Result<T, DasError>;
