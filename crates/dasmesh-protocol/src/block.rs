//! Blocks: a D x D grid of samples produced lazily in row-major order

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::region;
use crate::sample::{MappingFunction, Sample};
use crate::types::Distance;

/// A block of samples tagged with its sequence number.
///
/// The block never materializes its grid. It keeps a cursor over the
/// `dimension * dimension` cells that can be rewound with [`Block::init_iterator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    sequence_number: u64,
    dimension: u32,
    mapping: MappingFunction,
    cursor: u64,
}

impl Block {
    /// Create a new block
    pub fn new(dimension: u32, sequence_number: u64) -> Self {
        Self::with_mapping(dimension, sequence_number, MappingFunction::default())
    }

    /// Create a block whose sample ids are derived with `mapping`
    pub fn with_mapping(dimension: u32, sequence_number: u64, mapping: MappingFunction) -> Self {
        Block {
            sequence_number,
            dimension,
            mapping,
            cursor: 0,
        }
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn mapping(&self) -> MappingFunction {
        self.mapping
    }

    /// Number of grid cells (D²)
    pub fn num_samples(&self) -> usize {
        (u64::from(self.dimension) * u64::from(self.dimension)) as usize
    }

    /// Whether the sequence has samples left in this pass
    pub fn has_next(&self) -> bool {
        self.cursor < self.num_samples() as u64
    }

    /// Advance the sequence.
    ///
    /// Fails with [`ProtocolError::IterationExhausted`] once every cell has
    /// been produced, until the block is rewound.
    pub fn next_sample(&mut self) -> Result<Sample> {
        if !self.has_next() {
            return Err(ProtocolError::IterationExhausted {
                sequence: self.sequence_number,
            });
        }

        let dim = u64::from(self.dimension);
        let row = (self.cursor / dim) as u32;
        let column = (self.cursor % dim) as u32;
        self.cursor += 1;

        Ok(Sample::derive(
            self.sequence_number,
            self.dimension,
            row,
            column,
            self.mapping,
        ))
    }

    /// Rewind the sequence to its first cell
    pub fn init_iterator(&mut self) {
        self.cursor = 0;
    }

    /// Iterate over every sample without touching the block's own cursor
    pub fn samples(&self) -> Samples<'_> {
        Samples {
            block: self,
            position: 0,
        }
    }

    /// Radius giving each sample about `replication_target` holders among
    /// `network_size` peers.
    pub fn compute_region_radius(
        &self,
        replication_target: u32,
        network_size: usize,
    ) -> Result<Distance> {
        region::compute_region_radius(replication_target, network_size)
    }
}

/// Borrowing iterator returned by [`Block::samples`]
pub struct Samples<'a> {
    block: &'a Block,
    position: u64,
}

impl Iterator for Samples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.position >= self.block.num_samples() as u64 {
            return None;
        }
        let dim = u64::from(self.block.dimension);
        let row = (self.position / dim) as u32;
        let column = (self.position % dim) as u32;
        self.position += 1;

        Some(Sample::derive(
            self.block.sequence_number,
            self.block.dimension,
            row,
            column,
            self.block.mapping,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.block.num_samples() - self.position as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Samples<'_> {}
