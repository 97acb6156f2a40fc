//! Graph builder - turns parsed passages into nodes and links.
//!
//! Each passage becomes one of three shapes:
//! - **Empty body**: a single plain node named after the passage
//! - **Linear body**: a chain of plain nodes, one per line, linked in order
//! - **Body with choices**: the chain up to the first choice line, followed by
//!   a branch node holding every choice in the passage
//!
//! Choice targets name passages. They are resolved by id once every passage
//! has been built, and only against nodes created by the same build.

use std::collections::HashSet;

use dialogue_graph::{DialogueGraph, GraphError, Position};
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::twee::{branch_id_for, parse_dialogue_line, ParsedPassage};

/// A link recorded during building whose target is still a passage title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub source_id: String,
    pub source_port: usize,
    pub target_title: String,
}

/// Summary of one build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Ids of created nodes, in creation order.
    pub created: Vec<String>,

    /// Links created, chain links and resolved choices together.
    pub links_created: usize,

    /// Choices whose target did not match any created node.
    pub unresolved: Vec<PendingLink>,
}

/// Builds dialogue nodes from parsed passages.
pub struct GraphBuilder {
    config: BuilderConfig,
}

impl GraphBuilder {
    /// Create a new builder with the given configuration.
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// Create a builder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BuilderConfig::default())
    }

    /// Build passages into a fresh graph.
    pub fn build(&self, passages: &[ParsedPassage]) -> (DialogueGraph, BuildReport) {
        let mut graph = DialogueGraph::new();
        let report = self.build_into(&mut graph, passages);
        (graph, report)
    }

    /// Add the nodes for every passage to an existing graph, then resolve choices.
    pub fn build_into(&self, graph: &mut DialogueGraph, passages: &[ParsedPassage]) -> BuildReport {
        let mut report = BuildReport::default();
        let mut pending = Vec::new();
        let mut cursor = self.config.start();

        for passage in passages {
            self.build_passage(graph, passage, cursor, &mut report, &mut pending);
            cursor.y += self.config.passage_spacing;
        }

        let created: HashSet<&str> = report.created.iter().map(String::as_str).collect();
        let mut resolved = 0;
        let mut unresolved = Vec::new();
        for link in pending {
            if link.target_title.is_empty() || !created.contains(link.target_title.as_str()) {
                debug!(
                    source = %link.source_id,
                    target = %link.target_title,
                    "dropped unresolved choice"
                );
                unresolved.push(link);
                continue;
            }
            match graph.connect(&link.source_id, link.source_port, &link.target_title) {
                Ok(()) => resolved += 1,
                Err(err) => debug!(%err, "dropped choice link"),
            }
        }
        report.links_created += resolved;
        report.unresolved = unresolved;

        info!(
            passages = passages.len(),
            nodes = report.created.len(),
            links = report.links_created,
            unresolved = report.unresolved.len(),
            "built dialogue graph"
        );
        report
    }

    fn build_passage(
        &self,
        graph: &mut DialogueGraph,
        passage: &ParsedPassage,
        start: Position,
        report: &mut BuildReport,
        pending: &mut Vec<PendingLink>,
    ) {
        // A passage with no body is only a jump target.
        if passage.is_empty() {
            let id = graph.create_plain_node(start);
            if let Some(node) = graph.node_mut(&id) {
                node.speaker = passage.title.clone();
                node.text = passage.title.clone();
            }
            let id = assign_id(graph, id, &passage.title);
            report.created.push(id);
            return;
        }

        let mut position = start;
        let mut last: Option<(String, String)> = None;

        // Every chain node, the first included, shows its own parsed line.
        // The title only supplies the first node's id, never its text.
        for (index, line) in passage.chain_lines().iter().enumerate() {
            let line = parse_dialogue_line(line);
            let id = graph.create_plain_node(position);
            if let Some(node) = graph.node_mut(&id) {
                node.speaker = line.speaker;
                node.text = line.text.clone();
            }

            let wanted = if index == 0 {
                passage.title.clone()
            } else {
                format!("{}_line{}", passage.title, index)
            };
            let id = assign_id(graph, id, &wanted);

            if let Some((prev, _)) = &last {
                link_or_log(graph, prev, &id, report);
            }
            report.created.push(id.clone());
            last = Some((id, line.text));
            position.x += self.config.line_spacing;
        }

        if passage.branch_line().is_none() {
            return;
        }

        let branch = graph.create_branch_node(position);
        if let Some(node) = graph.node_mut(&branch) {
            node.text = match &last {
                Some((_, text)) => text.clone(),
                None => passage.title.clone(),
            };
        }
        let branch = assign_id(graph, branch, &branch_id_for(&passage.title));

        for choice in &passage.choices {
            match graph.add_choice(&branch, choice.choice_text.clone()) {
                Ok(port) => pending.push(PendingLink {
                    source_id: branch.clone(),
                    source_port: port,
                    target_title: choice.next_id.clone(),
                }),
                Err(err) => warn!(%err, "could not add choice"),
            }
        }

        if let Some((prev, _)) = &last {
            link_or_log(graph, prev, &branch, report);
        }
        report.created.push(branch);
    }
}

/// Give a freshly created node its authored id, keeping the generated id on conflict.
fn assign_id(graph: &mut DialogueGraph, id: String, wanted: &str) -> String {
    match graph.set_id(&id, wanted) {
        Ok(()) if !wanted.is_empty() => wanted.to_string(),
        Ok(()) => id,
        Err(GraphError::DuplicateId(_)) => {
            warn!(id = wanted, "duplicate passage id, keeping generated id");
            id
        }
        Err(err) => {
            warn!(%err, "could not assign node id");
            id
        }
    }
}

fn link_or_log(graph: &mut DialogueGraph, source: &str, target: &str, report: &mut BuildReport) {
    match graph.connect(source, 0, target) {
        Ok(()) => report.links_created += 1,
        Err(err) => debug!(%err, "could not chain nodes"),
    }
}
