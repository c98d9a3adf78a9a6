use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A position in the script: a label and a step within it.
///
/// `step` is either a valid index into the label or exactly its length,
/// which marks the end of the label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    /// Label being executed.
    pub label: String,
    /// Index of the statement within the label.
    pub step: usize,
}

impl Cursor {
    /// Cursor at `step` of `label`.
    pub fn new(label: impl Into<String>, step: usize) -> Self {
        Self {
            label: label.into(),
            step,
        }
    }

    /// Cursor at the first statement of a label.
    pub fn start(label: impl Into<String>) -> Self {
        Self::new(label, 0)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.step)
    }
}

/// Persisted narrative state: the cursor plus free-form variables.
///
/// Serializes as one flat JSON object, e.g.
/// `{"label": "Start", "step": 3, "particles": ""}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Label being executed.
    pub label: String,
    /// Index of the statement within the label.
    pub step: usize,
    #[serde(flatten)]
    vars: Map<String, Value>,
}

impl State {
    /// Create a state positioned at the start of `label` with no variables.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            step: 0,
            vars: Map::new(),
        }
    }

    /// The current position.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.label.clone(), self.step)
    }

    /// Move to `cursor`, keeping the variables.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.label = cursor.label;
        self.step = cursor.step;
    }

    /// Whether the state currently points at `cursor`.
    pub fn is_at(&self, cursor: &Cursor) -> bool {
        self.label == cursor.label && self.step == cursor.step
    }

    /// Read a persisted variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Read a persisted variable as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.vars.get(key).and_then(Value::as_str)
    }

    /// Set a persisted variable, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.vars.insert(key.into(), value.into())
    }

    /// Remove a persisted variable.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.vars.remove(key)
    }

    /// Every free-form variable.
    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    /// Shallow-merge another state over this one. Cursor and variables
    /// present in `other` win.
    pub fn merge(&mut self, other: State) {
        self.label = other.label;
        self.step = other.step;
        self.vars.extend(other.vars);
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new("Start")
    }
}
