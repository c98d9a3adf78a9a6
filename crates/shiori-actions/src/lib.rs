//! Built-in statement actions for Shiori.
//!
//! - [`Jump`]: `jump <label>` moves to another label and can be undone
//! - [`Next`]: `next` continues without waiting for input
//! - [`Particles`]: `particles <preset>` starts a particle system
//! - [`Choice`]: `{"Choice": {..}}` records offer a menu
//! - [`Dialog`]: every other text line is speech or narration
//!
//! [`default_registry`] registers them in match order, with the catch-all
//! dialog last.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use shiori_engine::Registry;

/// Choice menus and their conditions.
pub mod choice;
/// Dialog lines, characters and NVL pages.
pub mod dialog;
/// Jumps between labels.
pub mod jump;
/// Continue without input.
pub mod next;
/// Particle systems.
pub mod particles;
/// "Did you mean" suggestions.
pub mod suggest;

pub use choice::{Choice, Condition, MenuItem};
pub use dialog::{Character, Dialog};
pub use jump::{Jump, JumpEntry};
pub use next::Next;
pub use particles::Particles;

/// The built-in actions, ready for an engine.
pub fn default_registry(characters: BTreeMap<String, Character>, presets: Map<String, Value>) -> Registry {
    Registry::new()
        .with(Jump)
        .with(Next)
        .with(Particles::new().with_presets(presets))
        .with(Choice)
        .with(Dialog::new().with_characters(characters))
}
