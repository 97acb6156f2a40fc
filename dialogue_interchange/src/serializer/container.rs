//! Container form - the lossless persisted shape of a graph, positions included.

use dialogue_graph::{DialogueGraph, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A persisted node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub speaker: String,
    pub text: String,
    pub callback: String,
    pub position: Position,
    pub is_branch: bool,
    pub choice_labels: Vec<String>,
}

/// A persisted link. Port indices are signed so stale negative values still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkRecord {
    pub source_id: String,
    pub source_port_index: i64,
    pub target_id: String,
    pub target_port_index: i64,
}

/// Node and link records as saved from, and loaded into, a live graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerData {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

/// Clamp a stored port index into `0..count`. `None` when there are no ports.
fn clamp_port(index: i64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let max = (count - 1) as i64;
    Some(index.clamp(0, max) as usize)
}

impl ContainerData {
    /// Snapshot a live graph.
    pub fn capture(graph: &DialogueGraph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeRecord {
                id: node.id().to_string(),
                speaker: node.speaker.clone(),
                text: node.text.clone(),
                callback: node.callback.clone(),
                position: node.position,
                is_branch: node.is_branch(),
                choice_labels: node.choices().to_vec(),
            })
            .collect();

        let links = graph
            .links()
            .iter()
            .map(|link| LinkRecord {
                source_id: link.source_id.clone(),
                source_port_index: link.source_port as i64,
                target_id: link.target_id.clone(),
                target_port_index: link.target_port as i64,
            })
            .collect();

        Self { nodes, links }
    }

    /// Build a new graph from the records.
    ///
    /// Duplicate node ids are skipped. Links to unknown nodes are dropped and
    /// out-of-range port indices are clamped, so a stale container still loads.
    pub fn restore(&self) -> DialogueGraph {
        let mut graph = DialogueGraph::new();

        for record in &self.nodes {
            if graph.is_id_in_use(&record.id) {
                warn!(id = %record.id, "skipped duplicate node record");
                continue;
            }

            let id = if record.is_branch {
                graph.create_branch_node(record.position)
            } else {
                graph.create_plain_node(record.position)
            };
            if let Some(node) = graph.node_mut(&id) {
                node.speaker = record.speaker.clone();
                node.text = record.text.clone();
                node.callback = record.callback.clone();
            }
            if record.is_branch {
                for label in &record.choice_labels {
                    if let Err(err) = graph.add_choice(&id, label.clone()) {
                        warn!(%err, "could not add choice");
                    }
                }
            }
            if record.id.is_empty() {
                warn!(generated = %id, "node record without id");
            } else if let Err(err) = graph.set_id(&id, &record.id) {
                warn!(%err, "could not assign node id");
            }
        }

        let mut dropped = 0usize;
        for record in &self.links {
            let Some(port_count) = graph
                .node(&record.source_id)
                .map(|n| n.output_port_count())
            else {
                debug!(source = %record.source_id, "dropped link from unknown node");
                dropped += 1;
                continue;
            };
            if graph.node(&record.target_id).is_none() {
                debug!(target = %record.target_id, "dropped link to unknown node");
                dropped += 1;
                continue;
            }

            let Some(port) = clamp_port(record.source_port_index, port_count) else {
                debug!(source = %record.source_id, "dropped link from node without outputs");
                dropped += 1;
                continue;
            };
            if port as i64 != record.source_port_index || record.target_port_index != 0 {
                warn!(
                    source = %record.source_id,
                    stored = record.source_port_index,
                    clamped = port,
                    "clamped stale port index"
                );
            }

            if let Err(err) = graph.connect(&record.source_id, port, &record.target_id) {
                debug!(%err, "dropped link");
                dropped += 1;
            }
        }

        info!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            dropped,
            "restored dialogue container"
        );
        graph
    }

    /// Replace the contents of a live graph with the records.
    pub fn load_into(&self, graph: &mut DialogueGraph) {
        *graph = self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_graph::Link;

    fn sample_graph() -> DialogueGraph {
        let mut graph = DialogueGraph::new();
        let a = graph.create_plain_node(Position::new(10.0, 20.0));
        graph.set_id(&a, "a").unwrap();
        graph.node_mut("a").unwrap().text = "Hello".to_string();
        let b = graph.create_branch_node(Position::new(30.0, 40.0));
        graph.set_id(&b, "b").unwrap();
        graph.add_choice("b", "One").unwrap();
        graph.add_choice("b", "Two").unwrap();
        graph.connect("a", 0, "b").unwrap();
        graph.connect("b", 1, "a").unwrap();
        graph
    }

    #[test]
    fn test_capture_restore_is_lossless() {
        let graph = sample_graph();
        let restored = ContainerData::capture(&graph).restore();
        assert_eq!(restored, graph);
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(ContainerData::capture(&sample_graph())).unwrap();
        assert_eq!(json["nodes"][1]["isBranch"], true);
        assert_eq!(json["nodes"][1]["choiceLabels"][1], "Two");
        assert_eq!(json["links"][1]["sourcePortIndex"], 1);
        assert_eq!(json["nodes"][0]["position"]["x"], 10.0);
    }

    #[test]
    fn test_dangling_link_is_dropped() {
        let mut data = ContainerData::capture(&sample_graph());
        data.links.push(LinkRecord {
            source_id: "a".to_string(),
            source_port_index: 0,
            target_id: "ghost".to_string(),
            target_port_index: 0,
        });
        data.links.push(LinkRecord {
            source_id: "ghost".to_string(),
            source_port_index: 0,
            target_id: "a".to_string(),
            target_port_index: 0,
        });

        let graph = data.restore();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.link_from("a", 0).unwrap().target_id, "b");
    }

    #[test]
    fn test_out_of_range_ports_are_clamped() {
        let mut data = ContainerData::capture(&sample_graph());
        data.links = vec![
            LinkRecord {
                source_id: "b".to_string(),
                source_port_index: 7,
                target_id: "a".to_string(),
                target_port_index: 3,
            },
            LinkRecord {
                source_id: "a".to_string(),
                source_port_index: -2,
                target_id: "b".to_string(),
                target_port_index: 0,
            },
        ];

        let graph = data.restore();

        assert_eq!(graph.links(), [Link::new("b", 1, "a"), Link::new("a", 0, "b")]);
    }

    #[test]
    fn test_link_from_branch_without_choices_is_skipped() {
        let data = ContainerData {
            nodes: vec![
                NodeRecord {
                    id: "empty".to_string(),
                    is_branch: true,
                    ..Default::default()
                },
                NodeRecord {
                    id: "next".to_string(),
                    ..Default::default()
                },
            ],
            links: vec![LinkRecord {
                source_id: "empty".to_string(),
                source_port_index: 0,
                target_id: "next".to_string(),
                target_port_index: 0,
            }],
        };

        let graph = data.restore();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_load_into_replaces_graph() {
        let mut live = DialogueGraph::new();
        live.create_plain_node(Position::default());
        live.create_plain_node(Position::default());
        live.create_plain_node(Position::default());

        ContainerData::capture(&sample_graph()).load_into(&mut live);

        assert_eq!(live.node_count(), 2);
        assert!(live.node("a").is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let data: ContainerData = serde_json::from_str(r#"{"nodes": [{"id": "solo"}]}"#).unwrap();
        let graph = data.restore();
        assert_eq!(graph.node("solo").unwrap().position, Position::default());
        assert!(graph.links().is_empty());
    }
}
