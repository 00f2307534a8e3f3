//! DasMesh Core Library
//!
//! This is the main library that ties together all DasMesh components:
//! - Protocol (identifiers, blocks, samples, region math, envelopes)
//! - DHT (node directory, sample store, identifier generation)
//! - Routing (event queue, unreliable transport)
//! - DAS (per-node protocol state machine)

pub use dasmesh_das as das;
pub use dasmesh_dht as dht;
pub use dasmesh_protocol as protocol;
pub use dasmesh_routing as routing;

pub use das::DasError;
pub use protocol::ProtocolError;

use std::sync::Arc;

/// Initialize the DAS configuration shared by every node of a run.
///
/// Called once by the composition root before any node is constructed.
pub fn init(options: &das::DasOptions) -> Result<Arc<das::DasConfig>, DasError> {
    options.build().map(Arc::new)
}
