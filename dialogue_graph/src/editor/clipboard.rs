//! Copy buffer for duplicating a selection of nodes with their internal links.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::graph::DialogueGraph;
use crate::link::Link;
use crate::node::{DialogueNode, NodeKind, Position};

/// Offset applied to every pasted node relative to its original.
pub const DEFAULT_PASTE_OFFSET: Position = Position { x: 50.0, y: 50.0 };

/// A snapshot of selected nodes and the links running between them.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    nodes: Vec<DialogueNode>,
    links: Vec<Link>,
}

/// What a paste produced.
#[derive(Debug, Clone, Default)]
pub struct PasteOutcome {
    /// Original id -> id of its clone.
    pub id_map: HashMap<String, String>,

    /// Ids of the clones in paste order.
    pub created: Vec<String>,

    /// Number of links re-created between clones.
    pub links_created: usize,
}

impl Clipboard {
    /// Capture the selected nodes and every link whose endpoints are both selected.
    ///
    /// Unknown ids are ignored. Nodes are captured in graph order.
    pub fn copy<I, S>(graph: &DialogueGraph, selection: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected: HashSet<String> = selection
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let nodes: Vec<DialogueNode> = graph
            .nodes()
            .iter()
            .filter(|n| selected.contains(n.id()))
            .cloned()
            .collect();

        let links: Vec<Link> = graph
            .links()
            .iter()
            .filter(|l| selected.contains(&l.source_id) && selected.contains(&l.target_id))
            .cloned()
            .collect();

        if nodes.is_empty() {
            warn!("no nodes selected to copy");
        } else {
            debug!(nodes = nodes.len(), links = links.len(), "copied selection");
        }

        Self { nodes, links }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Paste using [`DEFAULT_PASTE_OFFSET`].
    pub fn paste(&self, graph: &mut DialogueGraph) -> PasteOutcome {
        self.paste_with_offset(graph, DEFAULT_PASTE_OFFSET)
    }

    /// Insert deep copies of the captured nodes with fresh ids, then re-create
    /// the captured links between the clones.
    ///
    /// Each link keeps its output port index and lands on the clone's input.
    pub fn paste_with_offset(&self, graph: &mut DialogueGraph, offset: Position) -> PasteOutcome {
        let mut outcome = PasteOutcome::default();
        if self.is_empty() {
            warn!("nothing copied to paste");
            return outcome;
        }

        for original in &self.nodes {
            let position = original.position.offset(offset);
            let clone_id = match original.kind {
                NodeKind::Plain => graph.create_plain_node(position),
                NodeKind::Branch { .. } => graph.create_branch_node(position),
            };
            if let Some(clone) = graph.node_mut(&clone_id) {
                clone.speaker = original.speaker.clone();
                clone.text = original.text.clone();
                clone.callback = original.callback.clone();
                clone.kind = original.kind.clone();
            }
            outcome
                .id_map
                .insert(original.id().to_string(), clone_id.clone());
            outcome.created.push(clone_id);
        }

        for link in &self.links {
            let (Some(source), Some(target)) = (
                outcome.id_map.get(&link.source_id),
                outcome.id_map.get(&link.target_id),
            ) else {
                continue;
            };
            match graph.connect(source, link.source_port, target) {
                Ok(()) => outcome.links_created += 1,
                Err(err) => debug!(%err, "skipped link while pasting"),
            }
        }

        debug!(
            nodes = outcome.created.len(),
            links = outcome.links_created,
            "pasted selection"
        );
        outcome
    }
}

/// Duplicate a selection in one step.
pub fn clone_selection<I, S>(graph: &mut DialogueGraph, selection: I) -> PasteOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Clipboard::copy(graph, selection).paste(graph)
}
