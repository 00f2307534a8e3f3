//! Routing error types

use thiserror::Error;

/// Routing-specific errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Invalid transport settings: {0}")]
    InvalidSettings(String),

    #[error("Protocol error: {0}")]
    Protocol(#[from] dasmesh_protocol::ProtocolError),
}

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;
