//! Node directory: identity and peer lookup for a node

use dasmesh_protocol::Identifier;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DhtError, Result};
use crate::node_info::NodeHandle;

/// The slice of the routing layer a DAS node is allowed to see
pub trait NodeDirectory: Send + Sync {
    /// Identifier of the local node
    fn self_id(&self) -> Identifier;

    /// Handle of the node owning `node_id`, if it is known
    fn resolve(&self, node_id: &Identifier) -> Option<NodeHandle>;
}

/// Directory of every node in the simulated network, filled once at startup
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    by_id: HashMap<Identifier, NodeHandle>,
    handles: Vec<NodeHandle>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node and return its handle
    pub fn register(&mut self, node_id: Identifier) -> Result<NodeHandle> {
        if self.by_id.contains_key(&node_id) {
            return Err(DhtError::DuplicateNode(node_id.to_string()));
        }

        let handle = NodeHandle::new(self.handles.len(), node_id);
        self.by_id.insert(node_id, handle);
        self.handles.push(handle);
        Ok(handle)
    }

    /// Lookup that reports a missing node as an error
    pub fn get(&self, node_id: &Identifier) -> Result<NodeHandle> {
        self.by_id
            .get(node_id)
            .copied()
            .ok_or_else(|| DhtError::NodeNotFound(node_id.to_string()))
    }

    /// All handles in registration order
    pub fn handles(&self) -> &[NodeHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// A node's view of this directory
    pub fn view_for(self: &Arc<Self>, node_id: Identifier) -> PeerView {
        PeerView {
            self_id: node_id,
            directory: Arc::clone(self),
        }
    }
}

/// Per-node [`NodeDirectory`] backed by a shared [`StaticDirectory`]
#[derive(Debug, Clone)]
pub struct PeerView {
    self_id: Identifier,
    directory: Arc<StaticDirectory>,
}

impl NodeDirectory for PeerView {
    fn self_id(&self) -> Identifier {
        self.self_id
    }

    fn resolve(&self, node_id: &Identifier) -> Option<NodeHandle> {
        self.directory.by_id.get(node_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> Identifier {
        Identifier::from_bytes([byte; 32])
    }

    #[test]
    fn test_register_assigns_sequential_indices() {
        let mut directory = StaticDirectory::new();
        let a = directory.register(id(1)).unwrap();
        let b = directory.register(id(2)).unwrap();

        assert_eq!(a.index, 0);
        assert_eq!(b.index, 1);
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.handles(), &[a, b]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut directory = StaticDirectory::new();
        directory.register(id(1)).unwrap();
        assert!(matches!(
            directory.register(id(1)),
            Err(DhtError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_peer_view_resolves() {
        let mut directory = StaticDirectory::new();
        let a = directory.register(id(1)).unwrap();
        let b = directory.register(id(2)).unwrap();
        let directory = Arc::new(directory);

        let view = directory.view_for(a.node_id);
        assert_eq!(view.self_id(), id(1));
        assert_eq!(view.resolve(&id(2)), Some(b));
        assert_eq!(view.resolve(&id(9)), None);
        assert!(matches!(directory.get(&id(9)), Err(DhtError::NodeNotFound(_))));
    }
}
