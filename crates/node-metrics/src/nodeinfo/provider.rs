//! Node providers: where node snapshots come from.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use super::snapshot::NodeSnapshot;

/// Supplies the current snapshot of a node.
///
/// Implementations are read concurrently by every node being polled.
pub trait NodeProvider: Send + Sync {
    /// Current snapshot of `node_name`, or `None` if the node is not known.
    fn get_node(&self, node_name: &str) -> Option<Arc<NodeSnapshot>>;

    /// Names of all nodes currently known, sorted.
    fn node_names(&self) -> Vec<String>;
}

impl<P: NodeProvider + ?Sized> NodeProvider for Arc<P> {
    fn get_node(&self, node_name: &str) -> Option<Arc<NodeSnapshot>> {
        (**self).get_node(node_name)
    }

    fn node_names(&self) -> Vec<String> {
        (**self).node_names()
    }
}

/// In-memory provider for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryNodeProvider {
    nodes: RwLock<HashMap<String, Arc<NodeSnapshot>>>,
}

impl InMemoryNodeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeSnapshot>) -> Self {
        let provider = Self::new();
        for node in nodes {
            provider.insert(node);
        }
        provider
    }

    /// Inserts or replaces a node, keyed by its name.
    pub fn insert(&self, node: NodeSnapshot) {
        self.nodes
            .write()
            .expect("poisoned")
            .insert(node.name.clone(), Arc::new(node));
    }

    pub fn remove(&self, node_name: &str) -> Option<Arc<NodeSnapshot>> {
        self.nodes.write().expect("poisoned").remove(node_name)
    }
}

impl NodeProvider for InMemoryNodeProvider {
    fn get_node(&self, node_name: &str) -> Option<Arc<NodeSnapshot>> {
        self.nodes.read().expect("poisoned").get(node_name).cloned()
    }

    fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.read().expect("poisoned").keys().cloned().collect();
        names.sort();
        names
    }
}
