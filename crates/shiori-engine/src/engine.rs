use std::sync::Arc;
use std::time::{Duration, Instant};

use shiori_core::{Cursor, Snapshot, State, Storage};
use tracing::{debug, info, warn};

use crate::action::{Action, Flow, Invocation, Parsed};
use crate::autoplay::AutoPlay;
use crate::config::{Preferences, Settings};
use crate::context::Context;
use crate::effect::Effect;
use crate::error::{EngineError, EngineResult};
use crate::registry::Registry;
use crate::report::Reporter;
use crate::script::{Script, Statement};

/// The interpreter: owns the context and drives statements forward and
/// backward through the registered actions.
pub struct Engine {
    ctx: Context,
    auto_play: AutoPlay,
    state_template: State,
    storage_template: Storage,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cursor", &self.ctx.cursor())
            .field("actions", &self.ctx.registry().len())
            .field("auto_play", &self.auto_play.is_active())
            .finish()
    }
}

impl Engine {
    /// An engine over `script` with the given actions. Call `setup` before starting.
    pub fn new(script: Script, registry: Registry, settings: Settings) -> Self {
        let ctx = Context::new(script, registry, settings);
        let auto_play = AutoPlay::new(auto_play_interval(&ctx.preferences));
        Self {
            state_template: ctx.state.clone(),
            storage_template: ctx.storage.clone(),
            ctx,
            auto_play,
        }
    }

    /// Initial world storage, restored on every new game.
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage_template = storage.clone();
        self.ctx.storage = storage;
        self
    }

    /// Send structural reports to `reporter` instead of the log.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.ctx.set_reporter(reporter);
        self
    }

    /// Start with `preferences` instead of the defaults.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.auto_play
            .set_interval(auto_play_interval(&preferences));
        self.ctx.preferences = preferences;
        self
    }

    /// Shared access to the running game.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Mutable access to the running game.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Where the game is.
    pub fn cursor(&self) -> Cursor {
        self.ctx.cursor()
    }

    /// The fixed game settings.
    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    pub(crate) fn actions(&self) -> Vec<Arc<dyn Action>> {
        self.ctx.registry().iter().cloned().collect()
    }

    /// Run every action's `setup`, then `bind`, then `init`, and remember the
    /// resulting state and storage as the new-game template.
    pub fn setup(&mut self) -> EngineResult<()> {
        let actions = self.actions();
        for action in &actions {
            action.setup(&mut self.ctx)?;
        }
        for action in &actions {
            action.bind(&mut self.ctx)?;
        }
        for action in &actions {
            action.init(&mut self.ctx)?;
        }
        self.state_template = self.ctx.state.clone();
        self.storage_template = self.ctx.storage.clone();
        debug!(actions = ?self.ctx.registry().ids(), "engine set up");
        Ok(())
    }

    /// Mark the game as playing and run the statement under the cursor.
    pub fn start(&mut self) -> EngineResult<()> {
        self.ctx.globals.playing = true;
        for action in self.actions() {
            action.on_start(&mut self.ctx)?;
        }
        info!(cursor = %self.ctx.cursor(), "game started");
        self.run_current()
    }

    /// Return to the new-game state: template state and storage, empty
    /// history stacks, fresh globals and every action's `reset`.
    pub fn reset_game(&mut self) -> EngineResult<()> {
        self.auto_play.stop();
        let playing = self.ctx.globals.playing;
        self.ctx.globals.reset();
        self.ctx.globals.playing = playing;
        self.ctx.state = self.state_template.clone();
        self.ctx.storage = self.storage_template.clone();
        self.ctx.history.clear_all();
        for action in self.actions() {
            action.reset(&mut self.ctx)?;
        }
        info!("game reset");
        Ok(())
    }

    /// Execute `statement` and keep going while actions ask to advance.
    pub fn run(&mut self, statement: Statement, advance: bool) -> EngineResult<()> {
        self.run_chain(statement, advance)
            .inspect_err(|err| log_failure("run", err, &self.ctx.cursor()))
    }

    /// Run the statement under the cursor.
    pub fn run_current(&mut self) -> EngineResult<()> {
        let statement = self.current()?;
        self.run(statement, true)
    }

    /// Move to the next step and run it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> EngineResult<()> {
        self.run_chain_from_next()
            .inspect_err(|err| log_failure("next", err, &self.ctx.cursor()))
    }

    fn run_chain_from_next(&mut self) -> EngineResult<()> {
        let statement = self.step_forward()?;
        self.run_chain(statement, true)
    }

    fn run_chain(&mut self, statement: Statement, advance: bool) -> EngineResult<()> {
        let mut statement = statement;
        let mut advance = advance;
        let mut executed = 0;

        loop {
            executed += 1;
            if executed > self.ctx.settings.max_chain {
                return Err(EngineError::ChainLimit {
                    limit: self.ctx.settings.max_chain,
                    cursor: self.ctx.cursor(),
                });
            }

            match self.apply(&statement, advance)? {
                Flow::Wait => return Ok(()),
                Flow::Advance if !advance => return Ok(()),
                Flow::Advance => statement = self.step_forward()?,
                Flow::Enter => {
                    advance = true;
                    statement = self.current()?;
                }
            }
        }
    }

    fn apply(&mut self, statement: &Statement, advance: bool) -> EngineResult<Flow> {
        debug!(
            cursor = %self.ctx.cursor(),
            statement = %statement.describe(),
            advance,
            "apply"
        );

        if let Statement::Callback(callback) = statement {
            self.ctx.globals.block = true;
            let result = callback.call(&mut self.ctx);
            self.ctx.globals.block = false;
            result?;
            return Ok(Flow::Advance);
        }

        let mut invocation = self.instantiate(statement)?;
        invocation.will_apply(&mut self.ctx)?;
        let effects = invocation.apply(&mut self.ctx, advance)?;
        self.ctx.emit_all(effects);
        let flow = invocation.did_apply(&mut self.ctx)?;
        debug!(?flow, "applied");
        Ok(flow)
    }

    /// Substitute, tokenize and match a statement, then build its invocation.
    fn instantiate(&self, statement: &Statement) -> EngineResult<Box<dyn Invocation>> {
        match statement {
            Statement::Text(raw) => {
                let text = self.ctx.substitute(raw)?;
                let tokens: Vec<&str> = text.split_whitespace().collect();
                let Some(action) = self.ctx.registry().find_for_tokens(&tokens) else {
                    return Err(EngineError::NoMatch(text.clone()));
                };
                action.instantiate(&Parsed::new(statement, &text, &tokens), &self.ctx)
            }
            Statement::Record(record) => {
                let Some(action) = self.ctx.registry().find_for_record(record) else {
                    return Err(EngineError::NoMatch(statement.describe()));
                };
                action.instantiate(&Parsed::new(statement, "", &[]), &self.ctx)
            }
            Statement::Callback(_) => Err(EngineError::Irreversible(self.ctx.cursor())),
        }
    }

    fn current(&self) -> EngineResult<Statement> {
        self.ctx
            .current_statement()
            .cloned()
            .ok_or_else(|| EngineError::NoStatement(self.ctx.cursor()))
    }

    /// Increment the step (never past the end of the label) and fetch the
    /// statement now under the cursor.
    fn step_forward(&mut self) -> EngineResult<Statement> {
        let len = self.ctx.label(&self.ctx.state.label).map_or(0, <[_]>::len);
        if self.ctx.state.step < len {
            self.ctx.state.step += 1;
        }
        self.current()
    }

    /// Undo the previous step.
    ///
    /// On failure the cursor is put back where it was, the statement under
    /// it is re-run in place and the error is returned.
    pub fn revert(&mut self) -> EngineResult<()> {
        let mut executed = 0;
        loop {
            executed += 1;
            if executed > self.ctx.settings.max_chain {
                let err = EngineError::ChainLimit {
                    limit: self.ctx.settings.max_chain,
                    cursor: self.ctx.cursor(),
                };
                log_failure("revert", &err, &self.ctx.cursor());
                return Err(err);
            }

            let origin = self.ctx.cursor();
            let target = if origin.step >= 1 {
                let previous = Cursor::new(origin.label.clone(), origin.step - 1);
                self.ctx.statement_at(&previous).cloned()
            } else {
                self.revert_origin()
            };
            let Some(target) = target else {
                debug!(cursor = %origin, "nothing to revert");
                return self.run_in_place();
            };

            match self.revert_statement(&target) {
                Ok(flow) => {
                    if self.ctx.state.is_at(&origin) && origin.step >= 1 {
                        self.ctx.state.step -= 1;
                    }
                    match flow {
                        Flow::Advance => continue,
                        Flow::Enter => return self.run_in_place(),
                        Flow::Wait => return Ok(()),
                    }
                }
                Err(err) => {
                    log_failure("revert", &err, &origin);
                    self.ctx.set_cursor(origin);
                    if let Err(rerun) = self.run_in_place() {
                        warn!(error = %rerun, "could not restore the current statement");
                    }
                    return Err(err);
                }
            }
        }
    }

    fn revert_origin(&self) -> Option<Statement> {
        self.ctx
            .registry()
            .iter()
            .find_map(|action| action.revert_origin(&self.ctx))
    }

    fn revert_statement(&mut self, statement: &Statement) -> EngineResult<Flow> {
        debug!(
            cursor = %self.ctx.cursor(),
            statement = %statement.describe(),
            "revert"
        );
        let mut invocation = self.instantiate(statement)?;
        invocation.will_revert(&mut self.ctx)?;
        let effects = invocation.revert(&mut self.ctx)?;
        self.ctx.emit_all(effects);
        let flow = invocation.did_revert(&mut self.ctx)?;
        debug!(?flow, "reverted");
        Ok(flow)
    }

    fn run_in_place(&mut self) -> EngineResult<()> {
        let statement = self.current()?;
        self.run(statement, false)
    }

    /// Whether the player may continue right now. Every action's guard is
    /// consulted, since some of them act on the request (finishing text).
    pub fn can_proceed(&mut self) -> bool {
        if !self.gates_open() {
            return false;
        }
        let mut allowed = true;
        for action in self.actions() {
            if !action.can_proceed(&mut self.ctx) {
                debug!(action = action.id(), "proceed refused");
                allowed = false;
            }
        }
        allowed
    }

    /// Whether every action and global gate allows going back.
    pub fn can_revert(&mut self) -> bool {
        if !self.gates_open() {
            return false;
        }
        let mut allowed = true;
        for action in self.actions() {
            if !action.can_revert(&mut self.ctx) {
                debug!(action = action.id(), "revert refused");
                allowed = false;
            }
        }
        allowed
    }

    fn gates_open(&self) -> bool {
        let globals = &self.ctx.globals;
        globals.playing && !globals.block && !globals.distraction_free
    }

    /// Continue if the guards allow it. Returns whether the engine moved.
    /// Guard rejections are expected and reported as `Ok(false)`.
    pub fn proceed(&mut self) -> EngineResult<bool> {
        if !self.can_proceed() {
            return Ok(false);
        }
        swallow_rejection(self.next())
    }

    /// Go back one step if the guards allow it.
    pub fn rollback(&mut self) -> EngineResult<bool> {
        if !self.can_revert() {
            return Ok(false);
        }
        swallow_rejection(self.revert())
    }

    /// Mark the running text animation as finished.
    pub fn finish_typing(&mut self) {
        self.ctx.globals.finished_typing = true;
    }

    /// Take every effect queued for the host.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.ctx.drain_effects()
    }

    /// The persisted part of the running game.
    pub fn snapshot(&self) -> Snapshot {
        self.ctx.snapshot()
    }

    /// Whether autoplay is armed.
    pub fn auto_play_active(&self) -> bool {
        self.auto_play.is_active()
    }

    /// Start or stop autoplay. The interval comes from the preferences.
    pub fn auto_play(&mut self, enable: bool, now: Instant) {
        if enable {
            self.auto_play
                .set_interval(auto_play_interval(&self.ctx.preferences));
            self.auto_play.start(now);
            debug!(interval = ?self.auto_play.interval(), "autoplay on");
        } else {
            self.auto_play.stop();
            debug!("autoplay off");
        }
    }

    /// Drive autoplay from the host loop.
    ///
    /// Returns how long to wait before calling again, or `None` when autoplay
    /// is off. A structural error stops autoplay and is returned.
    pub fn tick_auto_play(&mut self, now: Instant) -> EngineResult<Option<Duration>> {
        if !self.auto_play.is_due(now) {
            return Ok(self.auto_play.remaining(now));
        }
        if !self.can_proceed() {
            self.auto_play.postpone(now);
            return Ok(Some(self.auto_play.interval()));
        }
        let delay = self.auto_play.reschedule(now);
        if let Err(err) = swallow_rejection(self.next()) {
            self.auto_play.stop();
            return Err(err);
        }
        Ok(Some(delay))
    }
}

fn auto_play_interval(preferences: &Preferences) -> Duration {
    Duration::from_secs(u64::from(preferences.auto_play_speed))
}

fn swallow_rejection(result: EngineResult<()>) -> EngineResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_rejection() => Ok(false),
        Err(err) => Err(err),
    }
}

fn log_failure(operation: &str, err: &EngineError, cursor: &Cursor) {
    match err {
        EngineError::Rejected(reason) => {
            debug!(operation, %cursor, reason, "rejected");
        }
        EngineError::NoStatement(_) => {
            debug!(operation, %cursor, "end of label");
        }
        other => {
            warn!(operation, %cursor, error = %other, "statement failed");
        }
    }
}
