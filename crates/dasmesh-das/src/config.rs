//! Validated DAS configuration shared by every node of a run

use dasmesh_protocol::MappingFunction;
use serde::{Deserialize, Serialize};

use crate::error::{DasError, Result};

/// Grid dimension used when none is configured
pub const DEFAULT_BLOCK_DIMENSION: u32 = 10;

/// Deadline for an outstanding get-sample request (logical ms)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// What a validator does when a get-sample request times out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RetryPolicy {
    /// Evict the request and report a timeout
    #[default]
    Never,
    /// Re-issue the request until `max` attempts have been made
    Attempts { max: u32 },
}

impl RetryPolicy {
    /// Whether a request that already made `attempts` attempts may be re-sent
    pub fn allows_retry(&self, attempts: u32) -> bool {
        match self {
            RetryPolicy::Never => false,
            RetryPolicy::Attempts { max } => attempts < *max,
        }
    }
}

/// DAS options as they appear in a configuration file.
///
/// Every field is optional here; [`DasOptions::build`] checks the required
/// ones and fills in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DasOptions {
    /// Sample-id mapping function selector (required)
    #[serde(default)]
    pub mapping_fn: Option<u8>,

    /// Desired number of holders per sample (required)
    #[serde(default)]
    pub sample_copy_per_node: Option<u32>,

    /// Grid dimension `D`
    #[serde(default)]
    pub block_dim_size: Option<u32>,

    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl DasOptions {
    /// Validate and produce the immutable configuration
    pub fn build(&self) -> Result<DasConfig> {
        let selector = self
            .mapping_fn
            .ok_or_else(|| DasError::Configuration("das.mapping_fn is required".to_string()))?;
        let mapping = MappingFunction::from_u8(selector)
            .map_err(|e| DasError::Configuration(e.to_string()))?;

        let replication_target = self.sample_copy_per_node.ok_or_else(|| {
            DasError::Configuration("das.sample_copy_per_node is required".to_string())
        })?;

        let block_dimension = self.block_dim_size.unwrap_or(DEFAULT_BLOCK_DIMENSION);
        let request_timeout_ms = self
            .request_timeout_ms
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        DasConfig::new(
            replication_target,
            block_dimension,
            mapping,
            request_timeout_ms,
            self.retry,
        )
    }
}

/// Immutable DAS parameters, built once and shared by all nodes
#[derive(Debug, Clone, PartialEq)]
pub struct DasConfig {
    replication_target: u32,
    block_dimension: u32,
    mapping: MappingFunction,
    request_timeout_ms: u64,
    retry: RetryPolicy,
}

impl DasConfig {
    pub fn new(
        replication_target: u32,
        block_dimension: u32,
        mapping: MappingFunction,
        request_timeout_ms: u64,
        retry: RetryPolicy,
    ) -> Result<Self> {
        if block_dimension == 0 {
            return Err(DasError::Configuration(
                "block dimension must be at least 1".to_string(),
            ));
        }
        if request_timeout_ms == 0 {
            return Err(DasError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }
        if let RetryPolicy::Attempts { max: 0 } = retry {
            return Err(DasError::Configuration(
                "retry policy needs at least one attempt".to_string(),
            ));
        }

        Ok(DasConfig {
            replication_target,
            block_dimension,
            mapping,
            request_timeout_ms,
            retry,
        })
    }

    /// Desired number of holders per sample
    pub fn replication_target(&self) -> u32 {
        self.replication_target
    }

    pub fn block_dimension(&self) -> u32 {
        self.block_dimension
    }

    pub fn mapping(&self) -> MappingFunction {
        self.mapping
    }

    pub fn request_timeout_ms(&self) -> u64 {
        self.request_timeout_ms
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}
