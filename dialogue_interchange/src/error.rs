//! Errors surfaced by import, export and persistence.

use std::path::PathBuf;

use dialogue_graph::GraphError;
use thiserror::Error;

/// Errors that can occur while moving a dialogue graph in or out of files.
///
/// Malformed references inside otherwise readable input are never errors;
/// they are dropped or clamped during building and loading.
#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Result type for interchange operations.
pub type InterchangeResult<T> = Result<T, InterchangeError>;
