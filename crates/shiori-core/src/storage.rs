//! World data visible to the narrative and `{{path}}` substitution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Text inserted for an unresolved placeholder under [`UnresolvedPolicy::Literal`].
pub const UNDEFINED: &str = "undefined";

/// What to do when a `{{path}}` placeholder does not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Insert the text `undefined` in place of the placeholder.
    #[default]
    Literal,
    /// Insert nothing.
    Empty,
    /// Fail the statement with [`CoreError::UnresolvedPath`].
    Fail,
}

/// Free-form key/value world data (relationship counters, names, flags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Storage {
    data: Map<String, Value>,
}

impl Storage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build storage from a JSON value. Non-object values yield empty storage.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            _ => Self::default(),
        }
    }

    /// Top-level value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Replace the top-level value under `key`, returning the old one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.data.insert(key.into(), value.into())
    }

    /// Remove a top-level value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// The whole tree.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shallow-merge `other` over this storage.
    pub fn merge(&mut self, other: Storage) {
        self.data.extend(other.data);
    }

    /// Walk a dotted path (`player.stats.hp`, `items.0`) through objects and arrays.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.data.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Replace every `{{dotted.path}}` placeholder in `text` with the value
    /// found in storage.
    ///
    /// Strings are inserted without quotes; other values use their JSON
    /// text. A placeholder whose contents are empty or contain whitespace is
    /// left untouched.
    pub fn substitute(&self, text: &str, policy: UnresolvedPolicy) -> CoreResult<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find("{{") {
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                break;
            };
            let path = &after_open[..close];

            out.push_str(&rest[..open]);
            if path.is_empty() || path.chars().any(char::is_whitespace) {
                out.push_str(&rest[open..open + 2]);
                rest = after_open;
                continue;
            }

            match self.resolve(path) {
                Some(Value::String(s)) => out.push_str(s),
                Some(value) => out.push_str(&value.to_string()),
                None => match policy {
                    UnresolvedPolicy::Literal => out.push_str(UNDEFINED),
                    UnresolvedPolicy::Empty => {}
                    UnresolvedPolicy::Fail => {
                        return Err(CoreError::UnresolvedPath(path.to_string()));
                    }
                },
            }
            rest = &after_open[close + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}
