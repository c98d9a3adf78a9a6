//! Statement dispatch and run/revert engine for Shiori.
//!
//! A [`Script`] maps labels to ordered statements. The [`Engine`] walks the
//! script with a cursor, matches each statement against the actions in a
//! [`Registry`] and runs the resulting [`Invocation`] forward, or backward
//! when the player goes back. Actions keep what they need to undo a step in
//! per-category history stacks and describe what should appear on screen as
//! [`Effect`] values that the host drains.

/// Action descriptors, invocations and continuation flow.
pub mod action;
/// Drift-corrected autoplay timer.
pub mod autoplay;
/// Engine settings and player preferences.
pub mod config;
/// Mutable context shared with actions.
pub mod context;
/// Commands for the rendering host.
pub mod effect;
/// The run/revert interpreter.
pub mod engine;
/// Error types for the engine crate.
pub mod error;
/// Registered actions in match order.
pub mod registry;
/// Structural error reporting.
pub mod report;
/// Save slots and preferences.
pub mod saves;
/// Statements and the script store.
pub mod script;
/// The persistence boundary.
pub mod store;

pub use action::{Action, Flow, Invocation, Parsed};
pub use autoplay::AutoPlay;
pub use config::{Preferences, Settings};
pub use context::Context;
pub use effect::{ChoiceView, Effect, Line, Speaker, transcript};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use registry::Registry;
pub use report::{CollectingReporter, LogReporter, Report, Reporter};
pub use saves::{PREFERENCES_KEY, SlotEntry, SlotKind};
pub use script::{Callback, Script, Statement};
pub use store::{DirStore, MemoryStore, SaveStore, StoreError, StoreResult};
