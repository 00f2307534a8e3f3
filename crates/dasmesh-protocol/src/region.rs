//! Region assignment: which peers are responsible for which samples
//!
//! Both the per-node state machine and the round driver call these functions,
//! so a node's local decision always matches the driver's global view.

use primitive_types::U256;

use crate::error::{ProtocolError, Result};
use crate::sample::{Axis, Sample};
use crate::types::{Distance, Identifier};

/// Radius such that about `replication_target` of `network_size` uniformly
/// placed peers fall within it of any fixed identifier.
///
/// `radius = floor((2^256 - 1) * replication_target / network_size)`,
/// saturating at [`Distance::MAX`].
pub fn compute_region_radius(replication_target: u32, network_size: usize) -> Result<Distance> {
    if network_size == 0 {
        return Err(ProtocolError::UndefinedRadius);
    }
    if replication_target as usize >= network_size {
        return Ok(Distance::MAX);
    }

    // MAX = q * n + r, so MAX * t / n = q * t + (r * t) / n exactly
    let n = U256::from(network_size as u64);
    let t = U256::from(replication_target);
    let q = U256::MAX / n;
    let r = U256::MAX % n;

    Ok(Distance::from_u256(q * t + (r * t) / n))
}

pub fn is_in_region_by_row(sample: &Sample, peer: &Identifier, radius: &Distance) -> bool {
    sample.id_by_row().within_radius(peer, radius)
}

pub fn is_in_region_by_column(sample: &Sample, peer: &Identifier, radius: &Distance) -> bool {
    sample.id_by_column().within_radius(peer, radius)
}

/// A peer is in region for a sample when either addressing key is close enough
pub fn is_in_region(sample: &Sample, peer: &Identifier, radius: &Distance) -> bool {
    matching_axis(sample, peer, radius).is_some()
}

/// The axis whose identifier places `peer` in the sample's region.
///
/// The row test wins when both hold.
pub fn matching_axis(sample: &Sample, peer: &Identifier, radius: &Distance) -> Option<Axis> {
    if is_in_region_by_row(sample, peer, radius) {
        Some(Axis::Row)
    } else if is_in_region_by_column(sample, peer, radius) {
        Some(Axis::Column)
    } else {
        None
    }
}

impl Sample {
    /// Method form of [`is_in_region`]
    pub fn is_in_region(&self, peer: &Identifier, radius: &Distance) -> bool {
        is_in_region(self, peer, radius)
    }
}
