//! Auto-layout for graphs that arrive without positions.
//!
//! The algorithm works as follows:
//! 1. **Children**: group link targets by source, in link order
//! 2. **Roots**: nodes that are never a link target, in node order; a graph
//!    with no such node uses its first node as the only root
//! 3. **Placement**: depth-first from each root. The i-th child of a node at
//!    `(x, y)` goes to `(x + column_spacing, y + i * child_spacing)`. A node
//!    reachable along several paths is placed on its first visit only
//! 4. **Roots stack**: each root starts `root_spacing` below the previous one
//!
//! The walk uses an explicit stack so deep chains cannot overflow, and visits
//! children in the same order a recursive walk would.

use std::collections::{HashMap, HashSet};

use dialogue_graph::{DialogueGraph, Position};
use tracing::debug;

use crate::config::LayoutConfig;

/// Places nodes deterministically from graph structure alone.
pub struct AutoLayout {
    config: LayoutConfig,
}

impl AutoLayout {
    /// Create a new layout pass with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout pass with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    /// Compute positions in visit order without touching the graph.
    ///
    /// Nodes unreachable from any root are absent from the result.
    pub fn compute(&self, graph: &DialogueGraph) -> Vec<(String, Position)> {
        let node_ids: HashSet<&str> = graph.nodes().iter().map(|n| n.id()).collect();

        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut targets: HashSet<&str> = HashSet::new();
        for link in graph.links() {
            children
                .entry(link.source_id.as_str())
                .or_default()
                .push(link.target_id.as_str());
            targets.insert(link.target_id.as_str());
        }

        let mut roots: Vec<&str> = graph
            .nodes()
            .iter()
            .map(|n| n.id())
            .filter(|id| !targets.contains(id))
            .collect();
        if roots.is_empty() {
            roots.extend(graph.nodes().first().map(|n| n.id()));
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut placements = Vec::with_capacity(graph.node_count());
        let mut root_y = self.config.start_y;

        for root in roots {
            let mut stack = vec![(root, Position::new(self.config.start_x, root_y))];

            while let Some((id, position)) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                placements.push((id.to_string(), position));

                let Some(kids) = children.get(id) else {
                    continue;
                };
                // Reverse so the first child is popped first.
                for (index, child) in kids.iter().enumerate().rev() {
                    if !node_ids.contains(child) {
                        continue;
                    }
                    let child_position = Position::new(
                        position.x + self.config.column_spacing,
                        position.y + index as f32 * self.config.child_spacing,
                    );
                    stack.push((*child, child_position));
                }
            }

            root_y += self.config.root_spacing;
        }

        placements
    }

    /// Move every reachable node to its computed position.
    ///
    /// Returns the number of nodes placed.
    pub fn apply(&self, graph: &mut DialogueGraph) -> usize {
        let placements = self.compute(graph);
        for (id, position) in &placements {
            if let Some(node) = graph.node_mut(id) {
                node.position = *position;
            }
        }
        debug!(placed = placements.len(), total = graph.node_count(), "auto-layout applied");
        placements.len()
    }
}
