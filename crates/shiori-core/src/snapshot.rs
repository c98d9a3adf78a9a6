use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreResult;
use crate::history::History;
use crate::state::State;
use crate::storage::Storage;

/// Everything needed to resume a game: undo history, state, and storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Undo stacks per category.
    pub history: History,
    /// Cursor and free-form state variables.
    pub state: State,
    /// Author-visible world storage.
    pub storage: Storage,
}

impl Snapshot {
    /// Encode as the JSON stored in a save slot.
    pub fn to_value(&self) -> CoreResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode a snapshot written by [`Snapshot::to_value`].
    pub fn from_value(value: Value) -> CoreResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A saved game as written to the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSlot {
    /// Player-chosen name; defaults to the save date.
    pub name: String,
    /// Human-readable local date of the save.
    pub date: String,
    /// Scene image shown next to the slot, if a scene was on screen.
    #[serde(default)]
    pub image: Option<String>,
    /// The game as it was when saved.
    pub snapshot: Snapshot,
}

impl SaveSlot {
    /// Encode for the persistence boundary.
    pub fn to_value(&self) -> CoreResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode a slot read from the persistence boundary.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
