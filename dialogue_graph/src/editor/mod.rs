//! Editor operations - id entry validation, choice authoring, copy and paste.
//!
//! These operate on an explicitly passed [`DialogueGraph`] and rely only on
//! its mutation API.

mod clipboard;

pub use clipboard::*;

use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::DialogueGraph;

/// Normalise an id typed by an author: trimmed, embedded newlines become spaces.
pub fn normalize_id_input(raw: &str) -> String {
    raw.trim().replace("\r\n", " ").replace('\n', " ")
}

/// Check whether `candidate` may be assigned to the node currently holding `node_id`.
///
/// The node's own id never counts as a conflict.
pub fn is_id_acceptable(graph: &DialogueGraph, node_id: &str, candidate: &str) -> bool {
    !candidate.is_empty() && !graph.is_id_used_by_other(candidate, node_id)
}

/// Rename a node from author input.
///
/// Returns the id the node holds afterwards. A refused rename leaves the
/// original id in place and reports why.
pub fn rename_node(graph: &mut DialogueGraph, node_id: &str, raw: &str) -> GraphResult<String> {
    let candidate = normalize_id_input(raw);
    if candidate.is_empty() {
        return Err(GraphError::EmptyId);
    }
    if !is_id_acceptable(graph, node_id, &candidate) {
        debug!(node = node_id, candidate = %candidate, "rename refused, id in use");
        return Err(GraphError::DuplicateId(candidate));
    }
    graph.set_id(node_id, &candidate)?;
    Ok(candidate)
}

/// Append a choice with the default "Choice N" label to a branch node.
pub fn add_default_choice(graph: &mut DialogueGraph, node_id: &str) -> GraphResult<usize> {
    let next = graph
        .node(node_id)
        .map(|n| n.choices().len() + 1)
        .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
    graph.add_choice(node_id, format!("Choice {}", next))
}
