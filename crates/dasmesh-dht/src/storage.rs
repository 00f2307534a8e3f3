//! Builder-local key-value store for samples

use dasmesh_protocol::{Identifier, Sample};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stored sample payload with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntry {
    /// Primary key (the sample's row identifier)
    pub key: Identifier,

    /// Secondary key (the sample's column identifier)
    pub column_key: Identifier,

    /// Sequence number of the block the sample belongs to
    pub block_sequence: u64,

    /// The opaque payload
    pub value: Vec<u8>,

    /// Logical time the entry was stored
    pub stored_at: u64,
}

/// Insert-only mapping from sample identifier to payload.
///
/// Entries are keyed by row identifier; the column identifier is kept as an
/// alias so requests addressed by either key can be answered.
#[derive(Debug, Default)]
pub struct SampleStore {
    /// Stored entries by primary key
    entries: HashMap<Identifier, StorageEntry>,

    /// Column identifier -> primary key
    column_index: HashMap<Identifier, Identifier>,

    /// Current payload bytes held
    current_size: usize,
}

impl SampleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored samples
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payload bytes held
    pub fn size(&self) -> usize {
        self.current_size
    }

    /// Store a sample.
    ///
    /// Returns `true` when the sample was not present before. Storing the
    /// same sample again replaces its entry without growing the store.
    pub fn put(&mut self, sample: &Sample, now: u64) -> bool {
        let entry = StorageEntry {
            key: sample.id_by_row(),
            column_key: sample.id_by_column(),
            block_sequence: sample.block_sequence(),
            value: sample.payload().to_vec(),
            stored_at: now,
        };

        self.current_size += entry.value.len();
        self.column_index.insert(entry.column_key, entry.key);

        match self.entries.insert(entry.key, entry) {
            Some(old_entry) => {
                self.current_size -= old_entry.value.len();
                false
            }
            None => true,
        }
    }

    /// Look a sample up by its row or column identifier
    pub fn get(&self, sample_id: &Identifier) -> Option<&StorageEntry> {
        self.entries.get(sample_id).or_else(|| {
            self.column_index
                .get(sample_id)
                .and_then(|key| self.entries.get(key))
        })
    }

    pub fn contains(&self, sample_id: &Identifier) -> bool {
        self.get(sample_id).is_some()
    }

    /// Entries belonging to one block
    pub fn entries_for_block(&self, block_sequence: u64) -> Vec<&StorageEntry> {
        self.entries
            .values()
            .filter(|entry| entry.block_sequence == block_sequence)
            .collect()
    }
}
