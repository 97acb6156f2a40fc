//! The graph aggregate - the central structure holding all dialogue nodes and links.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::link::Link;
use crate::node::{DialogueNode, NodeKind, Position};

/// An insertion-ordered set of nodes plus the links between them.
///
/// Node ids are non-empty and pairwise distinct after every mutation made
/// through this type. Links refer to nodes by id and may dangle if a node's
/// choices are edited directly through [`DialogueGraph::node_mut`].
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct DialogueGraph {
    /// Nodes in insertion order; order is preserved for stable diffs.
    nodes: Vec<DialogueNode>,

    links: Vec<Link>,
}

impl DialogueGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a plain node at the given position and return its id.
    pub fn create_plain_node(&mut self, position: Position) -> String {
        self.push_fresh(DialogueNode::plain(position))
    }

    /// Create a branch node with no choices and return its id.
    pub fn create_branch_node(&mut self, position: Position) -> String {
        self.push_fresh(DialogueNode::branch(position))
    }

    fn push_fresh(&mut self, mut node: DialogueNode) -> String {
        // Regenerate until unused.
        while self.is_id_in_use(&node.id) {
            node.id = crate::node::fresh_node_id();
        }
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    /// Insert a fully formed node, keeping its id.
    ///
    /// Fails if the id is empty or already held by another node.
    pub fn insert_node(&mut self, node: DialogueNode) -> GraphResult<String> {
        if node.id.is_empty() {
            return Err(GraphError::EmptyId);
        }
        if self.is_id_in_use(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        let id = node.id.clone();
        self.nodes.push(node);
        Ok(id)
    }

    /// Append a choice to a branch node, returning the new choice's port index.
    pub fn add_choice(&mut self, node_id: &str, label: impl Into<String>) -> GraphResult<usize> {
        match &mut self.require_mut(node_id)?.kind {
            NodeKind::Branch { choices } => {
                choices.push(label.into());
                Ok(choices.len() - 1)
            }
            NodeKind::Plain => Err(GraphError::NotABranch(node_id.to_string())),
        }
    }

    /// Remove every choice of a branch node along with the links leaving it.
    pub fn clear_choices(&mut self, node_id: &str) -> GraphResult<()> {
        match &mut self.require_mut(node_id)?.kind {
            NodeKind::Branch { choices } => choices.clear(),
            NodeKind::Plain => return Err(GraphError::NotABranch(node_id.to_string())),
        }
        self.links.retain(|l| l.source_id != node_id);
        Ok(())
    }

    /// Change a node's id.
    ///
    /// An empty new id is ignored. A new id held by a different node is
    /// refused and the original id is kept. Links follow the rename.
    pub fn set_id(&mut self, current_id: &str, new_id: &str) -> GraphResult<()> {
        if new_id.is_empty() || new_id == current_id {
            self.require(current_id)?;
            return Ok(());
        }
        if self.is_id_in_use(new_id) {
            return Err(GraphError::DuplicateId(new_id.to_string()));
        }

        self.require_mut(current_id)?.id = new_id.to_string();
        for link in &mut self.links {
            if link.source_id == current_id {
                link.source_id = new_id.to_string();
            }
            if link.target_id == current_id {
                link.target_id = new_id.to_string();
            }
        }
        debug!(from = current_id, to = new_id, "renamed node");
        Ok(())
    }

    /// Check whether any node holds the id.
    pub fn is_id_in_use(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Check whether a node other than `except_id` holds the id.
    pub fn is_id_used_by_other(&self, id: &str, except_id: &str) -> bool {
        id != except_id && self.is_id_in_use(id)
    }

    /// Get node by id.
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get mutable node by id.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut DialogueNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn require(&self, id: &str) -> GraphResult<&DialogueNode> {
        self.node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    fn require_mut(&mut self, id: &str) -> GraphResult<&mut DialogueNode> {
        self.node_mut(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[DialogueNode] {
        &self.nodes
    }

    /// All links in creation order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Link an output port of `source_id` to the input of `target_id`.
    ///
    /// Output ports hold a single link, so an existing link from the same
    /// port is replaced.
    pub fn connect(&mut self, source_id: &str, source_port: usize, target_id: &str) -> GraphResult<()> {
        let port_count = self.require(source_id)?.output_port_count();
        self.require(target_id)?;
        if source_port >= port_count {
            return Err(GraphError::PortOutOfRange {
                node: source_id.to_string(),
                port: source_port,
                port_count,
            });
        }

        self.links
            .retain(|l| !(l.source_id == source_id && l.source_port == source_port));
        self.links.push(Link::new(source_id, source_port, target_id));
        Ok(())
    }

    /// Remove the link leaving the given output port, if any.
    pub fn disconnect(&mut self, source_id: &str, source_port: usize) -> Option<Link> {
        let index = self
            .links
            .iter()
            .position(|l| l.source_id == source_id && l.source_port == source_port)?;
        Some(self.links.remove(index))
    }

    /// Links leaving a node, in creation order.
    pub fn outgoing_links<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.iter().filter(move |l| l.source_id == node_id)
    }

    /// The link leaving a specific output port.
    pub fn link_from(&self, node_id: &str, port: usize) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.source_id == node_id && l.source_port == port)
    }

    /// Remove a node and every link touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<DialogueNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        self.links.retain(|l| !l.touches(id));
        Some(self.nodes.remove(index))
    }

    /// Remove all nodes and links.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }
}

/// Nodes go through [`DialogueGraph::insert_node`], so an empty or repeated
/// id fails deserialization instead of producing a graph.
impl<'de> Deserialize<'de> for DialogueGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct RawGraph {
            #[serde(default)]
            nodes: Vec<DialogueNode>,
            #[serde(default)]
            links: Vec<Link>,
        }

        let raw = RawGraph::deserialize(deserializer)?;
        let mut graph = DialogueGraph::new();
        for node in raw.nodes {
            graph.insert_node(node).map_err(serde::de::Error::custom)?;
        }
        graph.links = raw.links;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids_are_unique(graph: &DialogueGraph) -> bool {
        let ids: HashSet<_> = graph.nodes().iter().map(|n| n.id()).collect();
        ids.len() == graph.node_count()
    }

    #[test]
    fn test_create_nodes() {
        let mut graph = DialogueGraph::new();
        let plain = graph.create_plain_node(Position::new(0.0, 0.0));
        let branch = graph.create_branch_node(Position::new(10.0, 0.0));

        assert_eq!(graph.node_count(), 2);
        assert!(!graph.node(&plain).unwrap().is_branch());
        assert!(graph.node(&branch).unwrap().is_branch());
        assert_eq!(graph.nodes()[0].id(), plain);
        assert!(ids_are_unique(&graph));
    }

    #[test]
    fn test_add_choice_returns_port_index() {
        let mut graph = DialogueGraph::new();
        let branch = graph.create_branch_node(Position::default());

        assert_eq!(graph.add_choice(&branch, "Yes").unwrap(), 0);
        assert_eq!(graph.add_choice(&branch, "No").unwrap(), 1);
        assert_eq!(graph.node(&branch).unwrap().choices(), ["Yes", "No"]);
    }

    #[test]
    fn test_add_choice_on_plain_node_fails() {
        let mut graph = DialogueGraph::new();
        let plain = graph.create_plain_node(Position::default());

        assert_eq!(
            graph.add_choice(&plain, "Nope"),
            Err(GraphError::NotABranch(plain.clone()))
        );
    }

    #[test]
    fn test_clear_choices_drops_links() {
        let mut graph = DialogueGraph::new();
        let branch = graph.create_branch_node(Position::default());
        let target = graph.create_plain_node(Position::default());
        graph.add_choice(&branch, "Go").unwrap();
        graph.connect(&branch, 0, &target).unwrap();

        graph.clear_choices(&branch).unwrap();

        assert!(graph.node(&branch).unwrap().choices().is_empty());
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_set_id_empty_is_noop() {
        let mut graph = DialogueGraph::new();
        let id = graph.create_plain_node(Position::default());

        graph.set_id(&id, "").unwrap();
        assert!(graph.node(&id).is_some());
    }

    #[test]
    fn test_set_id_rejects_duplicate() {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::default());
        let b = graph.create_plain_node(Position::default());
        graph.set_id(&a, "intro").unwrap();

        assert_eq!(
            graph.set_id(&b, "intro"),
            Err(GraphError::DuplicateId("intro".to_string()))
        );
        assert!(graph.node(&b).is_some());
        assert!(ids_are_unique(&graph));
    }

    #[test]
    fn test_set_id_rewrites_links() {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::default());
        let b = graph.create_plain_node(Position::default());
        graph.connect(&a, 0, &b).unwrap();

        graph.set_id(&a, "start").unwrap();
        graph.set_id(&b, "end").unwrap();

        assert_eq!(graph.links()[0], Link::new("start", 0, "end"));
    }

    #[test]
    fn test_is_id_used_by_other_excludes_self() {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::default());
        graph.set_id(&a, "intro").unwrap();

        assert!(!graph.is_id_used_by_other("intro", "intro"));
        assert!(graph.is_id_used_by_other("intro", "other"));
        assert!(!graph.is_id_used_by_other("fresh", "intro"));
    }

    #[test]
    fn test_insert_node_rejects_duplicate() {
        let mut graph = DialogueGraph::new();
        let id = graph.create_plain_node(Position::default());

        let mut copy = DialogueNode::plain(Position::default());
        copy.id = id.clone();
        assert_eq!(graph.insert_node(copy), Err(GraphError::DuplicateId(id)));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_connect_replaces_existing_port_link() {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::default());
        let b = graph.create_plain_node(Position::default());
        let c = graph.create_plain_node(Position::default());

        graph.connect(&a, 0, &b).unwrap();
        graph.connect(&a, 0, &c).unwrap();

        assert_eq!(graph.link_count(), 1);
        assert_eq!(graph.link_from(&a, 0).unwrap().target_id, c);
    }

    #[test]
    fn test_connect_checks_port_range() {
        let mut graph = DialogueGraph::new();
        let branch = graph.create_branch_node(Position::default());
        let target = graph.create_plain_node(Position::default());

        let result = graph.connect(&branch, 0, &target);
        assert!(matches!(result, Err(GraphError::PortOutOfRange { port_count: 0, .. })));

        let result = graph.connect(&branch, 0, "missing");
        assert!(matches!(result, Err(GraphError::NodeNotFound(_))));
    }

    #[test]
    fn test_remove_node_drops_links() {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::default());
        let b = graph.create_plain_node(Position::default());
        let c = graph.create_plain_node(Position::default());
        graph.connect(&a, 0, &b).unwrap();
        graph.connect(&b, 0, &c).unwrap();

        let removed = graph.remove_node(&b);

        assert!(removed.is_some());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_disconnect_and_clear() {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::default());
        let b = graph.create_plain_node(Position::default());
        graph.connect(&a, 0, &b).unwrap();

        assert!(graph.disconnect(&a, 0).is_some());
        assert!(graph.disconnect(&a, 0).is_none());

        graph.clear();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_duplicate_ids() {
        let json = r#"{"nodes": [
            {"id": "same", "speaker": "", "text": "1", "callback": "", "position": {"x": 0.0, "y": 0.0}, "kind": "Plain"},
            {"id": "same", "speaker": "", "text": "2", "callback": "", "position": {"x": 0.0, "y": 0.0}, "kind": "Plain"}
        ], "links": []}"#;

        let result = serde_json::from_str::<DialogueGraph>(json);

        assert!(result.unwrap_err().to_string().contains("same"));
    }

    #[test]
    fn test_deserialize_rejects_empty_id() {
        let json = r#"{"nodes": [
            {"id": "", "speaker": "", "text": "", "callback": "", "position": {"x": 0.0, "y": 0.0}, "kind": "Plain"}
        ]}"#;

        assert!(serde_json::from_str::<DialogueGraph>(json).is_err());
    }

    #[test]
    fn test_serde_round_trip_keeps_graph() {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::new(1.0, 2.0));
        let b = graph.create_branch_node(Position::default());
        graph.add_choice(&b, "Go").unwrap();
        graph.connect(&a, 0, &b).unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let restored: DialogueGraph = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, graph);
        assert!(ids_are_unique(&restored));
    }
}
