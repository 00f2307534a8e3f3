//! Node handles and identifier generation

use dasmesh_protocol::Identifier;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Addressable reference to a node in the simulated network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle {
    /// Position of the node in the network
    pub index: usize,

    /// Overlay identifier of the node
    pub node_id: Identifier,
}

impl NodeHandle {
    pub fn new(index: usize, node_id: Identifier) -> Self {
        NodeHandle { index, node_id }
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node[{}]:{}", self.index, self.node_id)
    }
}

/// Draws node identifiers uniformly from the identifier space.
///
/// Seeded so a simulation run is reproducible; never returns the same
/// identifier twice.
pub struct UniformIdGenerator {
    rng: StdRng,
    issued: HashSet<Identifier>,
}

impl UniformIdGenerator {
    pub fn new(seed: u64) -> Self {
        UniformIdGenerator {
            rng: StdRng::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }

    /// Generate a fresh identifier
    pub fn generate(&mut self) -> Identifier {
        loop {
            let id = Identifier::random(&mut self.rng);
            if self.issued.insert(id) {
                return id;
            }
        }
    }

    /// Number of identifiers handed out so far
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}
