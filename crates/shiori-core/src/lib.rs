//! Core data model for Shiori: the persisted side of an interactive-fiction run.
//!
//! This crate holds everything a save slot contains (cursor and state, undo
//! history, world storage) plus the transient globals that are reset on a
//! new game. It knows nothing about statements or actions; the engine crate
//! builds on top of it.

/// Error types used throughout the crate.
pub mod error;
/// Transient runtime flags.
pub mod globals;
/// Per-category undo stacks.
pub mod history;
/// Snapshots and save slots.
pub mod snapshot;
/// Cursor and persisted state.
pub mod state;
/// World storage and variable substitution.
pub mod storage;

/// Re-export error types.
pub use error::{CoreError, CoreResult};
pub use globals::Globals;
pub use history::History;
pub use snapshot::{SaveSlot, Snapshot};
pub use state::{Cursor, State};
pub use storage::{Storage, UNDEFINED, UnresolvedPolicy};
