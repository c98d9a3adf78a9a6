use std::collections::HashMap;

use serde_json::Value;

/// Transient runtime flags. Never persisted; cleared on a new game.
#[derive(Debug, Clone)]
pub struct Globals {
    /// Set while a callback statement runs. Blocks continue/back input.
    pub block: bool,
    /// Whether a game is in progress (saving is only allowed while playing).
    pub playing: bool,
    /// The host hid the text box; continue/back input is ignored.
    pub distraction_free: bool,
    /// Cleared while the host animates text; set again once it finishes.
    pub finished_typing: bool,
    /// Next auto-save slot id, rotating through `1..=slots`.
    pub auto_save_slot: u32,
    values: HashMap<String, Value>,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            block: false,
            playing: false,
            distraction_free: false,
            finished_typing: true,
            auto_save_slot: 1,
            values: HashMap::new(),
        }
    }
}

impl Globals {
    /// Fresh globals for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an action-owned transient value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Mutable access to an action-owned transient value, inserting `default` first.
    pub fn entry(&mut self, key: &str, default: Value) -> &mut Value {
        self.values.entry(key.to_string()).or_insert(default)
    }

    /// Store an action-owned transient value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Drop an action-owned transient value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Reset everything for a new game.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let globals = Globals::new();
        assert!(!globals.block);
        assert!(!globals.playing);
        assert!(globals.finished_typing);
        assert_eq!(globals.auto_save_slot, 1);
    }

    #[test]
    fn entry_inserts_default_once() {
        let mut globals = Globals::new();
        globals.entry("page", json!([])).as_array_mut().unwrap().push(json!("a"));
        globals.entry("page", json!([])).as_array_mut().unwrap().push(json!("b"));
        assert_eq!(globals.get("page"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn reset_clears_values_and_flags() {
        let mut globals = Globals::new();
        globals.playing = true;
        globals.block = true;
        globals.set("nvl", true);

        globals.reset();

        assert!(!globals.playing);
        assert!(!globals.block);
        assert_eq!(globals.get("nvl"), None);
    }
}
