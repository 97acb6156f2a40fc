//! Directed edges between nodes, referenced by node id.

use serde::{Deserialize, Serialize};

/// A directed edge from a node's output port to another node's input port.
///
/// Endpoints are weak references: they name nodes by id and are resolved by
/// lookup, so a link never owns either endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub source_id: String,
    /// 0 for a plain node, the choice index for a branch node.
    pub source_port: usize,
    pub target_id: String,
    /// Always 0 for links created through the graph.
    pub target_port: usize,
}

impl Link {
    pub fn new(source_id: impl Into<String>, source_port: usize, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_port,
            target_id: target_id.into(),
            target_port: 0,
        }
    }

    /// Whether either endpoint names the given node.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }
}
