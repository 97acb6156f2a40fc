//! Serializer - moves a dialogue graph between its live and persisted forms.
//!
//! Two persisted forms carry the same logical content:
//! - **Container** ([`ContainerData`]): node and link records with positions and
//!   explicit port indices. Lossless; this is what saving and loading use.
//! - **Interchange JSON** ([`DialogueJsonRoot`]): a flat list of dialogue records
//!   where links become `nextId` fields. No positions, so importing runs
//!   auto-layout.

mod container;
mod json;

pub use container::*;
pub use json::*;
