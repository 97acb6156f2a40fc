//! # Dialogue Graph
//!
//! The data model for branching dialogue: plain and branch nodes, the links
//! between their ports, and the editing operations an author performs on them.
//! This crate is the single source of truth for graph structure and does not
//! perform any I/O.
//!
//! Nodes are referenced everywhere by their string id. Links hold ids, never
//! node references, so the same graph maps directly onto persisted forms.

pub mod editor;
pub mod error;
pub mod graph;
pub mod link;
pub mod node;

pub use editor::*;
pub use error::*;
pub use graph::*;
pub use link::*;
pub use node::*;
