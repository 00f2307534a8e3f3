//! DasMesh Protocol Module
//!
//! This module defines the data model shared by every DasMesh component:
//! - Identifier space with the XOR distance metric
//! - Blocks and the samples they lazily produce
//! - Region assignment (radius and membership)
//! - The message envelope exchanged between nodes

pub mod block;
pub mod error;
pub mod message;
pub mod region;
pub mod sample;
pub mod types;

pub use block::{Block, Samples};
pub use error::{ProtocolError, Result};
pub use message::{DasMessage, Envelope, RequestId};
pub use region::{
    compute_region_radius, is_in_region, is_in_region_by_column, is_in_region_by_row,
    matching_axis,
};
pub use sample::{Axis, MappingFunction, Sample};
pub use types::{distance, within_radius, Distance, Identifier};
