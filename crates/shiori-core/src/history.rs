use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named undo stacks, one per action category.
///
/// Actions push an entry while applying a statement and pop exactly one
/// entry while reverting it. The stacks hold opaque JSON values; the
/// meaning of an entry belongs to the action that owns the category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    categories: BTreeMap<String, Vec<Value>>,
}

impl History {
    /// Empty history with no categories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the stack for `name`, creating an empty one on first access.
    pub fn category(&mut self, name: &str) -> &mut Vec<Value> {
        self.categories.entry(name.to_string()).or_default()
    }

    /// Get the stack for `name` without creating it.
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.categories.get(name).map(Vec::as_slice)
    }

    /// Number of entries in a category (0 if it does not exist yet).
    pub fn len(&self, name: &str) -> usize {
        self.categories.get(name).map_or(0, Vec::len)
    }

    /// The newest entry of a category.
    pub fn peek(&self, name: &str) -> Option<&Value> {
        self.categories.get(name).and_then(|stack| stack.last())
    }

    /// Push `entry` onto `name`, creating the category if needed.
    pub fn push(&mut self, name: &str, entry: impl Into<Value>) {
        self.category(name).push(entry.into());
    }

    /// Pop the newest entry of `name`.
    pub fn pop(&mut self, name: &str) -> Option<Value> {
        self.categories.get_mut(name).and_then(Vec::pop)
    }

    /// Whether a category has been created.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Iterate over category names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Empty every stack while keeping the categories registered.
    pub fn clear_all(&mut self) {
        for stack in self.categories.values_mut() {
            stack.clear();
        }
    }

    /// Replace the stacks named in `other`, keeping the rest.
    pub fn merge(&mut self, other: History) {
        self.categories.extend(other.categories);
    }
}
