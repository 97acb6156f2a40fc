//! Configuration for graph building and auto-layout, loadable from TOML.

use std::path::Path;

use dialogue_graph::Position;
use serde::{Deserialize, Serialize};

use crate::error::InterchangeResult;
use crate::io::read_text;

/// Constants for the auto-layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub start_x: f32,
    pub start_y: f32,

    /// Horizontal distance from a parent to its children.
    pub column_spacing: f32,

    /// Vertical distance between siblings.
    pub child_spacing: f32,

    /// Vertical distance between the starts of successive root subtrees.
    pub root_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            start_y: 100.0,
            column_spacing: 350.0,
            child_spacing: 250.0,
            root_spacing: 400.0,
        }
    }
}

impl LayoutConfig {
    pub fn start(&self) -> Position {
        Position::new(self.start_x, self.start_y)
    }
}

/// Canvas placement used while building nodes from a script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub start_x: f32,
    pub start_y: f32,

    /// Horizontal advance per chained line within a passage.
    pub line_spacing: f32,

    /// Vertical advance per passage.
    pub passage_spacing: f32,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            start_y: 100.0,
            line_spacing: 350.0,
            passage_spacing: 250.0,
        }
    }
}

impl BuilderConfig {
    pub fn start(&self) -> Position {
        Position::new(self.start_x, self.start_y)
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CordConfig {
    pub layout: LayoutConfig,
    pub builder: BuilderConfig,
}

impl CordConfig {
    /// Parse configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> InterchangeResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> InterchangeResult<Self> {
        Self::from_toml_str(&read_text(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CordConfig::default();
        assert_eq!(config.layout.start(), Position::new(100.0, 100.0));
        assert_eq!(config.layout.column_spacing, 350.0);
        assert_eq!(config.layout.child_spacing, 250.0);
        assert_eq!(config.layout.root_spacing, 400.0);
        assert_eq!(config.builder.passage_spacing, 250.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CordConfig::from_toml_str(
            r#"
[layout]
column_spacing = 500.0
"#,
        )
        .unwrap();

        assert_eq!(config.layout.column_spacing, 500.0);
        assert_eq!(config.layout.child_spacing, 250.0);
        assert_eq!(config.builder, BuilderConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(CordConfig::from_toml_str("").unwrap(), CordConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(CordConfig::from_toml_str("[layout\nstart_x = ").is_err());
    }
}
