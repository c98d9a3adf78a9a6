//! Save slots and persisted preferences on top of a [`SaveStore`].

use chrono::Local;
use serde_json::Value;
use shiori_core::SaveSlot;
use tracing::info;

use crate::config::{Preferences, Settings};
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::store::{SaveStore, StoreError};

/// Store key holding the player's preferences.
pub const PREFERENCES_KEY: &str = "Settings";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which family of slots a save belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Player-made saves.
    Manual,
    /// Rotating automatic saves.
    Auto,
}

impl SlotKind {
    /// Key prefix configured for this kind.
    pub fn prefix(self, settings: &Settings) -> &str {
        match self {
            SlotKind::Manual => &settings.save_label,
            SlotKind::Auto => &settings.auto_save_label,
        }
    }
}

/// `"{prefix}_{id}"`.
pub fn slot_key(prefix: &str, id: u32) -> String {
    format!("{prefix}_{id}")
}

/// The numeric id of `key` if it belongs to `prefix`.
pub fn slot_id(prefix: &str, key: &str) -> Option<u32> {
    key.strip_prefix(prefix)?.strip_prefix('_')?.parse().ok()
}

/// A decoded slot together with where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry {
    /// Numeric slot id.
    pub id: u32,
    /// Store key, such as `Save_3`.
    pub key: String,
    /// The decoded slot.
    pub slot: SaveSlot,
}

impl Engine {
    /// Highest slot id in use for `kind`, or 0 if there are none.
    pub fn max_slot_id(&self, store: &dyn SaveStore, kind: SlotKind) -> EngineResult<u32> {
        let prefix = kind.prefix(self.settings());
        Ok(store
            .keys()?
            .iter()
            .filter_map(|key| slot_id(prefix, key))
            .max()
            .unwrap_or(0))
    }

    /// Write the current game to a slot. Does nothing unless a game is being
    /// played. Returns the key written.
    ///
    /// `id` defaults to one past the highest existing id and `name` to the
    /// current date.
    pub fn save_to(
        &mut self,
        store: &mut dyn SaveStore,
        kind: SlotKind,
        id: Option<u32>,
        name: Option<&str>,
    ) -> EngineResult<Option<String>> {
        if !self.context().globals.playing {
            return Ok(None);
        }

        let date = Local::now().format(DATE_FORMAT).to_string();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => date.clone(),
        };
        let id = match id {
            Some(id) => id,
            None => self.max_slot_id(store, kind)? + 1,
        };
        let image = self
            .context()
            .state
            .get_str("scene")
            .and_then(|scene| scene.split_whitespace().nth(1))
            .map(str::to_string);

        let slot = SaveSlot {
            name,
            date,
            image,
            snapshot: self.snapshot(),
        };
        let key = slot_key(kind.prefix(self.settings()), id);
        store.set(&key, slot.to_value()?)?;
        info!(%key, "game saved");
        Ok(Some(key))
    }

    /// Save to the next manual slot.
    pub fn save(
        &mut self,
        store: &mut dyn SaveStore,
        name: Option<&str>,
    ) -> EngineResult<Option<String>> {
        self.save_to(store, SlotKind::Manual, None, name)
    }

    /// Save to the rotating auto-save slot, cycling through `1..=slots`.
    pub fn auto_save(&mut self, store: &mut dyn SaveStore) -> EngineResult<Option<String>> {
        let id = self.context().globals.auto_save_slot;
        let key = self.save_to(store, SlotKind::Auto, Some(id), None)?;
        if key.is_some() {
            let slots = self.settings().slots.max(1);
            self.context_mut().globals.auto_save_slot = if id >= slots { 1 } else { id + 1 };
        }
        Ok(key)
    }

    /// Replace the running game with the one saved under `key` and resume it.
    pub fn load_from_slot(&mut self, store: &dyn SaveStore, key: &str) -> EngineResult<()> {
        let slot = SaveSlot::from_value(store.get(key)?)?;

        self.context_mut().globals.playing = true;
        self.reset_game()?;
        self.context_mut().restore(slot.snapshot);

        for action in self.actions() {
            action.on_load(self.context_mut())?;
        }
        info!(%key, cursor = %self.cursor(), "game loaded");
        self.run_current()
    }

    /// Every slot of `kind`, ordered by id.
    pub fn list_slots(&self, store: &dyn SaveStore, kind: SlotKind) -> EngineResult<Vec<SlotEntry>> {
        let prefix = kind.prefix(self.settings());
        let mut entries = Vec::new();
        for key in store.keys()? {
            let Some(id) = slot_id(prefix, &key) else {
                continue;
            };
            let slot = SaveSlot::from_value(store.get(&key)?)?;
            entries.push(SlotEntry { id, key, slot });
        }
        entries.sort_by_key(|entry| entry.id);
        Ok(entries)
    }

    /// Remove a slot from the store.
    pub fn delete_slot(&mut self, store: &mut dyn SaveStore, key: &str) -> EngineResult<()> {
        store.remove(key)?;
        info!(%key, "slot deleted");
        Ok(())
    }

    /// Merge stored preferences over the current ones, or store the current
    /// ones if nothing is stored yet.
    pub fn load_preferences(&mut self, store: &mut dyn SaveStore) -> EngineResult<()> {
        match store.get(PREFERENCES_KEY) {
            Ok(stored) => {
                let mut merged = serde_json::to_value(&self.context().preferences)?;
                if let (Value::Object(current), Value::Object(stored)) = (&mut merged, stored) {
                    current.extend(stored);
                }
                self.context_mut().preferences = serde_json::from_value(merged)?;
                Ok(())
            }
            Err(StoreError::NotFound(_)) => self.save_preferences(store),
            Err(err) => Err(err.into()),
        }
    }

    /// Write the current preferences.
    pub fn save_preferences(&self, store: &mut dyn SaveStore) -> EngineResult<()> {
        let value = serde_json::to_value(&self.context().preferences)?;
        store.set(PREFERENCES_KEY, value)?;
        Ok(())
    }

    /// The current player preferences.
    pub fn preferences(&self) -> &Preferences {
        &self.context().preferences
    }
}
