//! DHT error types

use thiserror::Error;

/// DHT-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DhtError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Duplicate node identifier: {0}")]
    DuplicateNode(String),
}

/// Result type for DHT operations
pub type Result<T> = std::result::Result<T, DhtError>;
