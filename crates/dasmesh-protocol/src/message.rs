//! Message types and structures

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::block::Block;
use crate::error::{ProtocolError, Result};
use crate::types::Identifier;

/// Per-node identifier of an outstanding get-sample request
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(value: u64) -> Self {
        RequestId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one
    pub fn next(&self) -> Self {
        RequestId(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Message kinds exchanged by the DAS protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DasMessage {
    /// A new block, announced by the driver to every node
    BlockAnnouncement { block: Block, network_size: usize },
    /// Validator asks the builder for one sample
    GetSampleRequest {
        request_id: RequestId,
        sample_id: Identifier,
    },
    /// Builder answers a get-sample request
    GetSampleResponse {
        request_id: RequestId,
        sample_id: Identifier,
        payload: Vec<u8>,
    },
    /// Driver hands a sample directly to a node found in its region
    SampleAssignment { sample_id: Identifier },
}

impl DasMessage {
    /// Short name used in logs and statistics
    pub fn kind(&self) -> &'static str {
        match self {
            DasMessage::BlockAnnouncement { .. } => "block-announcement",
            DasMessage::GetSampleRequest { .. } => "get-sample-request",
            DasMessage::GetSampleResponse { .. } => "get-sample-response",
            DasMessage::SampleAssignment { .. } => "sample-assignment",
        }
    }
}

/// A message in flight: body plus addressing and logical timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Logical time at which the message was created
    pub timestamp: u64,

    /// Source node ID
    pub source: Option<Identifier>,

    /// Destination node ID
    pub destination: Option<Identifier>,

    /// Message body
    pub body: DasMessage,
}

impl Envelope {
    /// Create a fully addressed message
    pub fn new(timestamp: u64, source: Identifier, destination: Identifier, body: DasMessage) -> Self {
        Envelope {
            timestamp,
            source: Some(source),
            destination: Some(destination),
            body,
        }
    }

    /// Validate addressing.
    ///
    /// Returns the (source, destination) pair of a well-formed message.
    pub fn validate(&self) -> Result<(Identifier, Identifier)> {
        let source = self.source.ok_or(ProtocolError::MissingField("source"))?;
        let destination = self
            .destination
            .ok_or(ProtocolError::MissingField("destination"))?;
        Ok((source, destination))
    }

    /// Validate addressing and check the message was meant for `local`
    pub fn validate_for(&self, local: &Identifier) -> Result<Identifier> {
        let (source, destination) = self.validate()?;
        if destination != *local {
            return Err(ProtocolError::Misrouted {
                expected: destination.to_string(),
                actual: local.to_string(),
            });
        }
        Ok(source)
    }

    /// Size of the bincode encoding
    pub fn encoded_len(&self) -> Result<usize> {
        bincode::serialized_size(self)
            .map(|size| size as usize)
            .map_err(|e| ProtocolError::SerializationFailed(e.to_string()))
    }
}
