//! DasMesh DAS protocol
//!
//! Per-node Data Availability Sampling logic:
//! - Validated configuration shared by every node of a run
//! - The reactive node state machine (builder and validator roles)
//! - Outstanding request tracking with deadline eviction and retries

pub mod config;
pub mod error;
pub mod ledger;
pub mod protocol;

pub use config::{
    DasConfig, DasOptions, RetryPolicy, DEFAULT_BLOCK_DIMENSION, DEFAULT_REQUEST_TIMEOUT_MS,
};
pub use error::{DasError, Result};
pub use ledger::{PendingRequest, PendingRequests};
pub use protocol::{Context, DasProtocol, NodeSettings, NodeStats, Role};
