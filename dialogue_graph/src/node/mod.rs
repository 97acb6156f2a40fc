//! Node definitions for the dialogue graph.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh node id that is not derived from any authored content.
pub fn fresh_node_id() -> String {
    Uuid::new_v4().to_string()
}

/// Authoring-canvas coordinates. Advisory only; nothing resolves by position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Translate by another position used as an offset vector.
    pub fn offset(self, by: Position) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// The two node variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NodeKind {
    /// A single dialogue line with one output port.
    #[default]
    Plain,
    /// A decision point. Each choice label owns the output port at its index.
    Branch { choices: Vec<String> },
}

/// A dialogue unit in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub(crate) id: String,
    pub speaker: String,
    pub text: String,
    /// Optional side-effect hook name. Opaque to the graph.
    pub callback: String,
    pub position: Position,
    pub kind: NodeKind,
}

impl DialogueNode {
    /// Create a plain node with a freshly generated id.
    pub fn plain(position: Position) -> Self {
        Self {
            id: fresh_node_id(),
            speaker: String::new(),
            text: String::new(),
            callback: String::new(),
            position,
            kind: NodeKind::Plain,
        }
    }

    /// Create a branch node with no choices and a freshly generated id.
    pub fn branch(position: Position) -> Self {
        Self {
            kind: NodeKind::Branch {
                choices: Vec::new(),
            },
            ..Self::plain(position)
        }
    }

    /// The node's id. Changing it goes through the graph so uniqueness holds.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, NodeKind::Branch { .. })
    }

    /// Choice labels in port order. Empty for plain nodes.
    pub fn choices(&self) -> &[String] {
        match &self.kind {
            NodeKind::Branch { choices } => choices,
            NodeKind::Plain => &[],
        }
    }

    /// Number of output ports: one for a plain node, one per choice for a branch.
    pub fn output_port_count(&self) -> usize {
        match &self.kind {
            NodeKind::Plain => 1,
            NodeKind::Branch { choices } => choices.len(),
        }
    }

    /// Every node has exactly one input port.
    pub fn input_port_count(&self) -> usize {
        1
    }

    /// Set speaker, text and callback in one step.
    pub fn with_content(
        mut self,
        speaker: impl Into<String>,
        text: impl Into<String>,
        callback: impl Into<String>,
    ) -> Self {
        self.speaker = speaker.into();
        self.text = text.into();
        self.callback = callback.into();
        self
    }
}
