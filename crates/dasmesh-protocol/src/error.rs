//! Error types for protocol operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Message for {expected} delivered to {actual}")]
    Misrouted { expected: String, actual: String },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Sample sequence of block {sequence} is exhausted")]
    IterationExhausted { sequence: u64 },

    #[error("Region radius is undefined for an empty network")]
    UndefinedRadius,

    #[error("Unknown sample mapping function: {0}")]
    UnknownMappingFunction(u8),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}
