//! Story files: a script plus the characters, presets and settings it uses.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use shiori_actions::{Character, default_registry};
use shiori_core::Storage;
use shiori_engine::{Engine, Script, Settings};

/// A story as read from disk.
#[derive(Debug, Deserialize)]
pub struct Story {
    pub script: Value,
    #[serde(default)]
    pub characters: BTreeMap<String, Character>,
    #[serde(default)]
    pub particles: Map<String, Value>,
    #[serde(default)]
    pub storage: Map<String, Value>,
    #[serde(default)]
    pub settings: Settings,
}

impl Story {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        serde_json::from_str(&text).map_err(|e| format!("invalid story {}: {e}", path.display()))
    }

    pub fn script(&self) -> Result<Script, String> {
        Script::from_value(self.script.clone(), self.settings.multi_language)
            .map_err(|e| e.to_string())
    }

    /// An engine with the built-in actions, set up and ready to start.
    pub fn engine(&self) -> Result<Engine, String> {
        let registry = default_registry(self.characters.clone(), self.particles.clone());
        let mut engine = Engine::new(self.script()?, registry, self.settings.clone())
            .with_storage(Storage::from_value(Value::Object(self.storage.clone())));
        engine.setup().map_err(|e| format!("setup failed: {e}"))?;
        Ok(engine)
    }
}
