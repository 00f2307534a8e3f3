//! DasMesh DHT collaborators
//!
//! The DAS core only consumes a narrow slice of the overlay:
//! - Node identity and peer lookup ([`NodeDirectory`])
//! - Identifier assignment for simulated peers
//! - The builder's local sample key-value store

pub mod directory;
pub mod error;
pub mod node_info;
pub mod storage;

pub use directory::{NodeDirectory, PeerView, StaticDirectory};
pub use error::{DhtError, Result};
pub use node_info::{NodeHandle, UniformIdGenerator};
pub use storage::{SampleStore, StorageEntry};
