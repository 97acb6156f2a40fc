//! # Dialogue Interchange
//!
//! Moves dialogue graphs in and out of files. This crate reads Twee scripts,
//! builds and lays out graphs from them, and persists graphs as interchange
//! JSON or as lossless containers.
//!
//! ## Core Components
//!
//! - **twee**: Splits a script into passages, lines and choices
//! - **builder**: Turns parsed passages into nodes and links
//! - **layout**: Places nodes that arrive without positions
//! - **serializer**: JSON interchange and container forms
//! - **store**: Container storage backends (files, memory)
//! - **io**: End-to-end import, export, save and load workflows
//!
//! ## Tolerance
//!
//! Unreadable files are errors. Inside a readable file, dangling references
//! and stale port indices are dropped or clamped with a log line, so partially
//! broken input still loads.

pub mod builder;
pub mod config;
pub mod error;
pub mod io;
pub mod layout;
pub mod serializer;
pub mod store;
pub mod twee;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use io::*;
pub use layout::*;
pub use serializer::*;
pub use store::*;
pub use twee::*;
