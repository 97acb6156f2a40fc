//! JSON interchange form - a flat list of dialogue records without positions.

use std::collections::HashSet;

use dialogue_graph::{DialogueGraph, Position};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::error::InterchangeResult;
use crate::layout::AutoLayout;

/// Root object of an interchange file: `{ "dialogs": [...] }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueJsonRoot {
    #[serde(deserialize_with = "null_as_default")]
    pub dialogs: Vec<DialogueJsonDialog>,
}

/// One dialogue record. A non-empty `choices` list makes it a branch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DialogueJsonDialog {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub speaker: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub callback: String,
    #[serde(deserialize_with = "null_as_default")]
    pub choices: Vec<DialogueJsonChoice>,
}

/// One choice of a branch record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DialogueJsonChoice {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    /// Written empty and ignored on import; kept so existing files round-trip.
    #[serde(deserialize_with = "null_as_default")]
    pub callback: String,
}

/// Read an explicit `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Absent and empty references both mean "no link".
fn non_empty(reference: &Option<String>) -> Option<&str> {
    reference.as_deref().filter(|s| !s.is_empty())
}

/// Flatten a graph into interchange records.
///
/// Links whose target is not in the graph are left out.
pub fn export_json(graph: &DialogueGraph) -> DialogueJsonRoot {
    let ids: HashSet<&str> = graph.nodes().iter().map(|n| n.id()).collect();
    let live_target = |target: &str| ids.contains(target).then(|| target.to_string());

    let dialogs = graph
        .nodes()
        .iter()
        .map(|node| {
            let mut dialog = DialogueJsonDialog {
                id: node.id().to_string(),
                speaker: node.speaker.clone(),
                text: node.text.clone(),
                callback: node.callback.clone(),
                ..Default::default()
            };

            if node.is_branch() {
                dialog.choices = node
                    .choices()
                    .iter()
                    .enumerate()
                    .map(|(port, label)| DialogueJsonChoice {
                        text: label.clone(),
                        next_id: graph
                            .link_from(node.id(), port)
                            .and_then(|l| live_target(l.target_id.as_str())),
                        callback: String::new(),
                    })
                    .collect();
            } else {
                dialog.next_id = graph
                    .outgoing_links(node.id())
                    .next()
                    .and_then(|l| live_target(l.target_id.as_str()));
            }
            dialog
        })
        .collect();

    DialogueJsonRoot { dialogs }
}

/// Rebuild a graph from interchange records and lay it out.
///
/// Records with a duplicate id are skipped. References to unknown ids are dropped.
pub fn import_json(root: &DialogueJsonRoot, layout: &LayoutConfig) -> DialogueGraph {
    let mut graph = DialogueGraph::new();
    // Record index -> id the node ended up with.
    let mut accepted: Vec<Option<String>> = Vec::with_capacity(root.dialogs.len());

    for dialog in &root.dialogs {
        if !dialog.id.is_empty() && graph.is_id_in_use(&dialog.id) {
            warn!(id = %dialog.id, "skipped duplicate dialog record");
            accepted.push(None);
            continue;
        }

        let is_branch = !dialog.choices.is_empty();
        let id = if is_branch {
            graph.create_branch_node(Position::default())
        } else {
            graph.create_plain_node(Position::default())
        };
        if let Some(node) = graph.node_mut(&id) {
            node.speaker = dialog.speaker.clone();
            node.text = dialog.text.clone();
            node.callback = dialog.callback.clone();
        }
        for choice in &dialog.choices {
            if let Err(err) = graph.add_choice(&id, choice.text.clone()) {
                warn!(%err, "could not add choice");
            }
        }

        let id = if dialog.id.is_empty() {
            warn!(generated = %id, "dialog record without id");
            id
        } else {
            match graph.set_id(&id, &dialog.id) {
                Ok(()) => dialog.id.clone(),
                Err(err) => {
                    warn!(%err, "could not assign dialog id");
                    id
                }
            }
        };
        accepted.push(Some(id));
    }

    let mut dropped = 0usize;
    for (dialog, id) in root.dialogs.iter().zip(&accepted) {
        let Some(id) = id else { continue };

        let mut references = Vec::new();
        if let Some(next) = non_empty(&dialog.next_id) {
            references.push((0, next));
        }
        for (port, choice) in dialog.choices.iter().enumerate() {
            if let Some(next) = non_empty(&choice.next_id) {
                references.push((port, next));
            }
        }

        for (port, target) in references {
            if let Err(err) = graph.connect(id, port, target) {
                debug!(%err, source = %id, target, "dropped dialog reference");
                dropped += 1;
            }
        }
    }

    AutoLayout::new(*layout).apply(&mut graph);
    info!(
        nodes = graph.node_count(),
        links = graph.link_count(),
        dropped,
        "imported dialogue JSON"
    );
    graph
}

/// Render interchange records as pretty-printed JSON.
pub fn to_json_string(root: &DialogueJsonRoot) -> InterchangeResult<String> {
    Ok(serde_json::to_string_pretty(root)?)
}

/// Parse interchange records from JSON text.
pub fn from_json_str(text: &str) -> InterchangeResult<DialogueJsonRoot> {
    Ok(serde_json::from_str(text)?)
}
