//! Samples and the functions that map grid cells into the identifier space

use blake2::{Blake2b512, Digest};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::error::{ProtocolError, Result};
use crate::types::{Identifier, ID_SIZE};

/// Size of the opaque payload carried by every sample
pub const SAMPLE_PAYLOAD_SIZE: usize = 32;

/// The two addressing keys of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    fn tag(self) -> u8 {
        match self {
            Axis::Row => 0x52,
            Axis::Column => 0x43,
        }
    }
}

/// How row and column identifiers are derived from a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum MappingFunction {
    /// Cells are spread over equal slots of the identifier space
    #[default]
    Linear = 0,
    /// Cells are hashed together with the block sequence number
    Hashed = 1,
}

impl MappingFunction {
    /// Create from the numeric selector used in configuration files
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(MappingFunction::Linear),
            1 => Ok(MappingFunction::Hashed),
            _ => Err(ProtocolError::UnknownMappingFunction(value)),
        }
    }

    /// Convert to u8
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Identifier of cell `(row, column)` addressed along `axis`.
    ///
    /// Pure function of its arguments.
    pub fn sample_id(
        self,
        sequence: u64,
        dimension: u32,
        row: u32,
        column: u32,
        axis: Axis,
    ) -> Identifier {
        match self {
            MappingFunction::Linear => {
                let cells = u64::from(dimension) * u64::from(dimension);
                if cells == 0 {
                    return Identifier::ZERO;
                }
                // Row ids take the lower D² slots and column ids the upper D²,
                // so no column id ever equals a row id.
                let index = match axis {
                    Axis::Row => u64::from(row) * u64::from(dimension) + u64::from(column),
                    Axis::Column => {
                        cells + u64::from(column) * u64::from(dimension) + u64::from(row)
                    }
                };
                let slot = U256::MAX / (U256::from(cells) * U256::from(2u8));
                Identifier::from_u256(slot * U256::from(index))
            }
            MappingFunction::Hashed => {
                let mut hasher = Blake2b512::new();
                hasher.update(sequence.to_le_bytes());
                hasher.update(row.to_le_bytes());
                hasher.update(column.to_le_bytes());
                hasher.update([axis.tag()]);
                let hash = hasher.finalize();

                let mut id = [0u8; ID_SIZE];
                id.copy_from_slice(&hash[..ID_SIZE]);
                Identifier::from_bytes(id)
            }
        }
    }
}

/// One grid cell of a block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    block_sequence: u64,
    row: u32,
    column: u32,
    row_id: Identifier,
    column_id: Identifier,
    payload: Vec<u8>,
}

impl Sample {
    pub(crate) fn derive(
        sequence: u64,
        dimension: u32,
        row: u32,
        column: u32,
        mapping: MappingFunction,
    ) -> Self {
        Sample {
            block_sequence: sequence,
            row,
            column,
            row_id: mapping.sample_id(sequence, dimension, row, column, Axis::Row),
            column_id: mapping.sample_id(sequence, dimension, row, column, Axis::Column),
            payload: payload_for(sequence, row, column),
        }
    }

    pub fn block_sequence(&self) -> u64 {
        self.block_sequence
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Primary key of the sample (its row identifier)
    pub fn id(&self) -> Identifier {
        self.row_id
    }

    pub fn id_by_row(&self) -> Identifier {
        self.row_id
    }

    pub fn id_by_column(&self) -> Identifier {
        self.column_id
    }

    pub fn id_by(&self, axis: Axis) -> Identifier {
        match axis {
            Axis::Row => self.row_id,
            Axis::Column => self.column_id,
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.block_sequence == other.block_sequence
            && self.row == other.row
            && self.column == other.column
    }
}

impl Eq for Sample {}

impl Hash for Sample {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.block_sequence.hash(state);
        self.row.hash(state);
        self.column.hash(state);
    }
}

fn payload_for(sequence: u64, row: u32, column: u32) -> Vec<u8> {
    let mut hasher = Blake2b512::new();
    hasher.update(b"payload");
    hasher.update(sequence.to_le_bytes());
    hasher.update(row.to_le_bytes());
    hasher.update(column.to_le_bytes());
    hasher.finalize()[..SAMPLE_PAYLOAD_SIZE].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_selector() {
        assert_eq!(MappingFunction::from_u8(0).unwrap(), MappingFunction::Linear);
        assert_eq!(MappingFunction::from_u8(1).unwrap(), MappingFunction::Hashed);
        assert_eq!(
            MappingFunction::from_u8(7),
            Err(ProtocolError::UnknownMappingFunction(7))
        );
        assert_eq!(MappingFunction::Hashed.to_u8(), 1);
    }

    #[test]
    fn test_linear_mapping_spreads_cells() {
        let mapping = MappingFunction::Linear;
        let first = mapping.sample_id(0, 4, 0, 0, Axis::Row);
        let second = mapping.sample_id(0, 4, 0, 1, Axis::Row);
        let last = mapping.sample_id(0, 4, 3, 3, Axis::Row);

        assert_eq!(first, Identifier::ZERO);
        assert!(first < second);
        assert!(second < last);
        assert_eq!(second.to_u256(), U256::MAX / U256::from(32u64));
    }

    #[test]
    fn test_linear_column_ids_never_equal_row_ids() {
        let mapping = MappingFunction::Linear;
        let dimension = 4;
        let mut rows = std::collections::HashSet::new();
        let mut columns = std::collections::HashSet::new();
        for row in 0..dimension {
            for column in 0..dimension {
                rows.insert(mapping.sample_id(0, dimension, row, column, Axis::Row));
                columns.insert(mapping.sample_id(0, dimension, row, column, Axis::Column));
            }
        }

        assert_eq!(rows.len(), 16);
        assert_eq!(columns.len(), 16);
        assert!(rows.is_disjoint(&columns));
        // the transposed cell no longer shares an id
        assert_ne!(
            mapping.sample_id(0, 4, 1, 2, Axis::Column),
            mapping.sample_id(0, 4, 2, 1, Axis::Row)
        );
        assert!(mapping.sample_id(0, 4, 0, 0, Axis::Column) > mapping.sample_id(0, 4, 3, 3, Axis::Row));
    }

    #[test]
    fn test_hashed_mapping_depends_on_sequence_and_axis() {
        let mapping = MappingFunction::Hashed;
        let a = mapping.sample_id(1, 4, 2, 3, Axis::Row);
        assert_eq!(a, mapping.sample_id(1, 4, 2, 3, Axis::Row));
        assert_ne!(a, mapping.sample_id(2, 4, 2, 3, Axis::Row));
        assert_ne!(a, mapping.sample_id(1, 4, 2, 3, Axis::Column));
    }

    #[test]
    fn test_sample_identity() {
        let a = Sample::derive(3, 4, 1, 2, MappingFunction::Linear);
        let b = Sample::derive(3, 4, 1, 2, MappingFunction::Hashed);
        let c = Sample::derive(4, 4, 1, 2, MappingFunction::Linear);

        // identity is (block, row, column), not the derived ids
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.id(), a.id_by(Axis::Row));
        assert_eq!(a.payload().len(), SAMPLE_PAYLOAD_SIZE);
        assert_eq!(a.payload(), b.payload());
    }
}
