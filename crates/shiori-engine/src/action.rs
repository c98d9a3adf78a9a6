use std::fmt::Debug;

use serde_json::{Map, Value};

use crate::context::Context;
use crate::effect::Effect;
use crate::error::EngineResult;
use crate::script::Statement;

/// What the engine does after a lifecycle stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Stop and wait for player input.
    Wait,
    /// Keep moving in the current direction without input.
    #[default]
    Advance,
    /// The action moved the cursor; run the statement now under it.
    Enter,
}

/// A matched statement as seen by an action factory.
#[derive(Debug, Clone, Copy)]
pub struct Parsed<'a> {
    raw: &'a Statement,
    text: &'a str,
    tokens: &'a [&'a str],
}

impl<'a> Parsed<'a> {
    /// Bundle a statement with its substituted text and tokens.
    pub fn new(raw: &'a Statement, text: &'a str, tokens: &'a [&'a str]) -> Self {
        Self { raw, text, tokens }
    }

    /// The statement as written in the script.
    pub fn raw(&self) -> &'a Statement {
        self.raw
    }

    /// Text after substitution. Empty for records.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Substituted text after the first token, with its original spacing.
    pub fn body(&self) -> &'a str {
        let trimmed = self.text.trim_start();
        match self.tokens.first() {
            Some(first) => trimmed.get(first.len()..).unwrap_or_default().trim_start(),
            None => "",
        }
    }

    /// Whitespace tokens after substitution. Empty for records.
    pub fn tokens(&self) -> &'a [&'a str] {
        self.tokens
    }

    /// The token at `index`, if any.
    pub fn token(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    /// The statement's object form, for record statements.
    pub fn record(&self) -> Option<&'a Map<String, Value>> {
        self.raw.as_record()
    }

    /// Tokens from `index` on, joined by single spaces.
    pub fn rest_from(&self, index: usize) -> String {
        self.tokens.get(index..).unwrap_or_default().join(" ")
    }
}

/// An action descriptor: decides which statements it handles and creates
/// an [`Invocation`] for each one.
///
/// Actions are registered once and matched in registration order. Matching
/// only sees the statement, never the engine state.
pub trait Action: Debug + Send + Sync {
    /// Stable identifier.
    fn id(&self) -> &str;

    /// Whether this action handles a text statement, given its tokens.
    fn match_string(&self, _tokens: &[&str]) -> bool {
        false
    }

    /// Whether this action handles an object statement.
    fn match_record(&self, _record: &Map<String, Value>) -> bool {
        false
    }

    /// Build the invocation for one matched statement.
    fn instantiate(&self, parsed: &Parsed<'_>, ctx: &Context) -> EngineResult<Box<dyn Invocation>>;

    /// Register history categories and state defaults.
    fn setup(&self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Attach input wiring. Runs after every action's `setup`.
    fn bind(&self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Finalize after `setup` and `bind`.
    fn init(&self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Clear per-game data for a new game.
    fn reset(&self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Called when a new game starts, after `reset`.
    fn on_start(&self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Re-apply persisted presentation after a save is loaded.
    fn on_load(&self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Whether the player may continue. May have side effects, such as
    /// finishing a text animation instead.
    fn can_proceed(&self, _ctx: &mut Context) -> bool {
        true
    }

    /// Whether the player may go back.
    fn can_revert(&self, _ctx: &mut Context) -> bool {
        true
    }

    /// A statement whose revert undoes the entry into the current label.
    /// Consulted when reverting from the first step of a label.
    fn revert_origin(&self, _ctx: &Context) -> Option<Statement> {
        None
    }
}

/// One statement's execution. Created fresh for every run or revert.
pub trait Invocation: Debug {
    /// Check preconditions. An error stops the statement before it runs.
    fn will_apply(&mut self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Perform the statement. `advance` is false when the statement is
    /// re-run in place (after a revert or a load).
    fn apply(&mut self, _ctx: &mut Context, _advance: bool) -> EngineResult<Vec<Effect>> {
        Ok(Vec::new())
    }

    /// What the engine does after `apply`.
    fn did_apply(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(Flow::Advance)
    }

    /// Check preconditions for undoing the statement.
    fn will_revert(&mut self, _ctx: &mut Context) -> EngineResult<()> {
        Ok(())
    }

    /// Undo the statement, popping whatever `apply` pushed.
    fn revert(&mut self, _ctx: &mut Context) -> EngineResult<Vec<Effect>> {
        Ok(Vec::new())
    }

    /// What the engine does after `revert`.
    fn did_revert(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(Flow::Advance)
    }
}
