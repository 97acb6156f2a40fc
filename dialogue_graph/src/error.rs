//! Errors raised by graph mutations.

use thiserror::Error;

/// Errors that can occur while mutating a dialogue graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Node id must not be empty")]
    EmptyId,

    #[error("Node id already in use: {0}")]
    DuplicateId(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node is not a branch: {0}")]
    NotABranch(String),

    #[error("Port {port} out of range for node {node} ({port_count} output ports)")]
    PortOutOfRange {
        node: String,
        port: usize,
        port_count: usize,
    },
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
