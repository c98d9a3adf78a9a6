use std::fmt;
use std::sync::Arc;

use shiori_core::{Cursor, Globals, History, Snapshot, State, Storage};

use crate::config::{Preferences, Settings};
use crate::effect::Effect;
use crate::error::EngineResult;
use crate::registry::Registry;
use crate::report::{LogReporter, Report, Reporter};
use crate::script::{Script, Statement};

/// Mutable context handed to actions at every lifecycle stage.
///
/// Owns the persisted data (state, history, storage), the transient
/// globals, the script, the action registry and the queue of effects
/// waiting for the host.
pub struct Context {
    /// Cursor and state variables.
    pub state: State,
    /// Undo stacks.
    pub history: History,
    /// World storage used for substitution.
    pub storage: Storage,
    /// Transient flags, reset on a new game.
    pub globals: Globals,
    /// Fixed game settings.
    pub settings: Settings,
    /// Player preferences.
    pub preferences: Preferences,
    script: Script,
    registry: Registry,
    effects: Vec<Effect>,
    reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cursor", &self.state.cursor())
            .field("actions", &self.registry.ids())
            .field("pending_effects", &self.effects.len())
            .finish()
    }
}

impl Context {
    /// Context with default state and an empty history.
    pub fn new(script: Script, registry: Registry, settings: Settings) -> Self {
        Self {
            state: State::new(settings.start_label.clone()),
            history: History::new(),
            storage: Storage::new(),
            globals: Globals::new(),
            preferences: Preferences::default(),
            settings,
            script,
            registry,
            effects: Vec::new(),
            reporter: Arc::new(LogReporter),
        }
    }

    pub(crate) fn set_reporter(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporter = reporter;
    }

    /// The loaded script.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Mutable access to the script, for hosts that add labels.
    pub fn script_mut(&mut self) -> &mut Script {
        &mut self.script
    }

    /// Registered actions.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the registered actions.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Active script language. Empty for single-language scripts.
    pub fn language(&self) -> &str {
        if self.settings.multi_language {
            &self.preferences.language
        } else {
            ""
        }
    }

    /// Statements of `name` in the current language.
    pub fn label(&self, name: &str) -> Option<&[Statement]> {
        self.script.label(self.language(), name)
    }

    /// Whether `name` exists in the current language.
    pub fn has_label(&self, name: &str) -> bool {
        self.label(name).is_some()
    }

    /// Label names in the current language.
    pub fn label_names(&self) -> Vec<&str> {
        self.script.label_names(self.language())
    }

    /// The statement at `cursor`, if any.
    pub fn statement_at(&self, cursor: &Cursor) -> Option<&Statement> {
        self.script.statement(self.language(), cursor)
    }

    /// The statement under the cursor.
    pub fn current_statement(&self) -> Option<&Statement> {
        self.statement_at(&self.state.cursor())
    }

    /// Where the game is.
    pub fn cursor(&self) -> Cursor {
        self.state.cursor()
    }

    /// Move the cursor.
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.state.set_cursor(cursor);
    }

    /// Queue an effect for the host.
    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Queue several effects.
    pub fn emit_all(&mut self, effects: impl IntoIterator<Item = Effect>) {
        self.effects.extend(effects);
    }

    /// Effects queued since the last drain.
    pub fn pending_effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Take every queued effect, oldest first.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Send a structural error report to the configured reporter.
    pub fn report(&self, report: Report) {
        self.reporter.report(&report);
    }

    /// Replace `{{path}}` placeholders using storage and the configured policy.
    pub fn substitute(&self, text: &str) -> EngineResult<String> {
        Ok(self.storage.substitute(text, self.settings.unresolved)?)
    }

    /// Capture the persisted part of the context.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            history: self.history.clone(),
            state: self.state.clone(),
            storage: self.storage.clone(),
        }
    }

    /// Merge a snapshot over the current data.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.state.merge(snapshot.state);
        self.history.merge(snapshot.history);
        self.storage.merge(snapshot.storage);
    }
}
