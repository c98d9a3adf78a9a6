use std::sync::Arc;

use serde_json::{Map, Value};

use crate::action::Action;

/// Registered actions in match-priority order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    actions: Vec<Arc<dyn Action>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. Earlier registrations win ties.
    pub fn register<A: Action + 'static>(&mut self, action: A) {
        self.actions.push(Arc::new(action));
    }

    /// Add a shared action.
    pub fn register_arc(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    /// Builder form of [`Registry::register`].
    pub fn with<A: Action + 'static>(mut self, action: A) -> Self {
        self.register(action);
        self
    }

    /// Remove an action by id. Returns whether one was removed.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.actions.len();
        self.actions.retain(|action| action.id() != id);
        self.actions.len() != before
    }

    /// The action registered as `id`.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Action>> {
        self.actions.iter().find(|action| action.id() == id)
    }

    /// First action whose string predicate accepts `tokens`.
    pub fn find_for_tokens(&self, tokens: &[&str]) -> Option<Arc<dyn Action>> {
        let found = self
            .actions
            .iter()
            .find(|action| action.match_string(tokens))
            .cloned();
        tracing::trace!(
            tokens = ?tokens,
            action = found.as_ref().map(|a| a.id()),
            "matched text statement"
        );
        found
    }

    /// First action whose record predicate accepts `record`.
    pub fn find_for_record(&self, record: &Map<String, Value>) -> Option<Arc<dyn Action>> {
        let found = self
            .actions
            .iter()
            .find(|action| action.match_record(record))
            .cloned();
        tracing::trace!(
            keys = ?record.keys().collect::<Vec<_>>(),
            action = found.as_ref().map(|a| a.id()),
            "matched record statement"
        );
        found
    }

    /// Actions in match order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Action>> {
        self.actions.iter()
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no action is registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action ids in match order.
    pub fn ids(&self) -> Vec<&str> {
        self.actions.iter().map(|action| action.id()).collect()
    }
}
