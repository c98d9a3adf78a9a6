//! `jump <label>`: move the cursor to the start of another label.

use serde::{Deserialize, Serialize};
use shiori_core::Cursor;
use shiori_engine::{
    Action, Context, Effect, EngineError, EngineResult, Flow, Invocation, Parsed, Report,
    Statement,
};
use tracing::debug;

use crate::dialog;
use crate::suggest::suggest;

/// History category holding one [`JumpEntry`] per executed jump.
pub const JUMP_HISTORY: &str = "jump";
/// History category holding the name of every entered label.
pub const LABEL_HISTORY: &str = "label";

/// Where a jump came from and where it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JumpEntry {
    /// Label the jump was made from.
    pub from: String,
    /// Label jumped to.
    pub to: String,
    /// Step of the jump statement in `from`.
    pub step: usize,
}

/// Descriptor for `jump` statements.
#[derive(Debug, Default)]
pub struct Jump;

impl Action for Jump {
    fn id(&self) -> &str {
        "jump"
    }

    fn match_string(&self, tokens: &[&str]) -> bool {
        tokens.first() == Some(&"jump")
    }

    fn instantiate(&self, parsed: &Parsed<'_>, _ctx: &Context) -> EngineResult<Box<dyn Invocation>> {
        Ok(Box::new(JumpTo {
            target: parsed.token(1).unwrap_or_default().to_string(),
            statement: parsed.text().to_string(),
        }))
    }

    fn setup(&self, ctx: &mut Context) -> EngineResult<()> {
        ctx.history.category(LABEL_HISTORY);
        ctx.history.category(JUMP_HISTORY);
        Ok(())
    }

    /// Reverting from the first step of a label undoes the jump that
    /// entered it, if the newest jump landed here.
    fn revert_origin(&self, ctx: &Context) -> Option<Statement> {
        if ctx.state.step != 0 {
            return None;
        }
        let entry: JumpEntry = serde_json::from_value(ctx.history.peek(JUMP_HISTORY)?.clone()).ok()?;
        (entry.to == ctx.state.label).then(|| Statement::text(format!("jump {}", entry.to)))
    }
}

#[derive(Debug)]
struct JumpTo {
    target: String,
    statement: String,
}

impl Invocation for JumpTo {
    fn will_apply(&mut self, ctx: &mut Context) -> EngineResult<()> {
        if ctx.has_label(&self.target) {
            return Ok(());
        }
        let suggestions = suggest(&self.target, ctx.label_names(), 3);
        let mut report = Report::new(
            "Label not found",
            format!("The game attempted to jump to \"{}\" but it does not exist.", self.target),
        )
        .with_detail("Label", self.target.as_str());
        if !suggestions.is_empty() {
            report = report.with_detail("Did you mean", suggestions.join(", "));
        }
        ctx.report(
            report
                .with_detail("Statement", self.statement.as_str())
                .with_detail("Cursor", ctx.cursor().to_string()),
        );
        Err(EngineError::UnresolvedTarget {
            label: self.target.clone(),
        })
    }

    fn apply(&mut self, ctx: &mut Context, _advance: bool) -> EngineResult<Vec<Effect>> {
        let from = ctx.cursor();
        let entry = JumpEntry {
            from: from.label.clone(),
            to: self.target.clone(),
            step: from.step,
        };
        ctx.history.push(JUMP_HISTORY, serde_json::to_value(&entry)?);
        ctx.set_cursor(Cursor::start(self.target.clone()));
        let effects = dialog::reset_dialog(ctx);
        ctx.history.push(LABEL_HISTORY, self.target.clone());
        debug!(from = %from, to = %self.target, "jumped");
        Ok(effects)
    }

    fn did_apply(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(Flow::Enter)
    }

    fn revert(&mut self, ctx: &mut Context) -> EngineResult<Vec<Effect>> {
        let Some(entry) = ctx.history.pop(JUMP_HISTORY) else {
            return Err(EngineError::rejected_because("no jump to revert"));
        };
        let entry: JumpEntry = serde_json::from_value(entry)?;
        ctx.history.pop(LABEL_HISTORY);
        ctx.set_cursor(Cursor::new(entry.from.clone(), entry.step));
        debug!(to = %entry.to, back = %ctx.cursor(), "jump reverted");
        Ok(dialog::reset_dialog(ctx))
    }

    /// Back on the jump statement itself, keep going to whatever came
    /// before it. Anywhere else (a choice that jumped), show it again.
    fn did_revert(&mut self, ctx: &mut Context) -> EngineResult<Flow> {
        let on_jump = match ctx.current_statement().and_then(Statement::as_text) {
            Some(text) => ctx.substitute(text)?.split_whitespace().next() == Some("jump"),
            None => false,
        };
        Ok(if on_jump { Flow::Advance } else { Flow::Enter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shiori_engine::{Registry, Script, Settings};

    fn context() -> Context {
        let script = Script::from_value(
            json!({
                "Start": ["Bob: Hello", "jump Next"],
                "Next": ["Bob: Welcome"]
            }),
            false,
        )
        .unwrap();
        let mut ctx = Context::new(script, Registry::new().with(Jump), Settings::default());
        Jump.setup(&mut ctx).unwrap();
        ctx
    }

    fn invocation(ctx: &Context, text: &str) -> Box<dyn Invocation> {
        let statement = Statement::text(text);
        let tokens: Vec<&str> = text.split_whitespace().collect();
        Jump.instantiate(&Parsed::new(&statement, text, &tokens), ctx)
            .unwrap()
    }

    #[test]
    fn matches_only_jump_keyword() {
        assert!(Jump.match_string(&["jump", "Next"]));
        assert!(!Jump.match_string(&["Bob:", "jump"]));
        assert!(!Jump.match_string(&[]));
    }

    #[test]
    fn apply_records_origin_and_moves_cursor() {
        let mut ctx = context();
        ctx.set_cursor(Cursor::new("Start", 1));
        let mut jump = invocation(&ctx, "jump Next");

        jump.will_apply(&mut ctx).unwrap();
        jump.apply(&mut ctx, true).unwrap();

        assert_eq!(ctx.cursor(), Cursor::new("Next", 0));
        assert_eq!(
            ctx.history.peek(JUMP_HISTORY),
            Some(&json!({"from": "Start", "to": "Next", "step": 1}))
        );
        assert_eq!(ctx.history.peek(LABEL_HISTORY), Some(&json!("Next")));
        assert_eq!(jump.did_apply(&mut ctx).unwrap(), Flow::Enter);
    }

    #[test]
    fn revert_restores_the_jump_position() {
        let mut ctx = context();
        ctx.set_cursor(Cursor::new("Start", 1));
        invocation(&ctx, "jump Next").apply(&mut ctx, true).unwrap();

        let mut back = invocation(&ctx, "jump Next");
        back.revert(&mut ctx).unwrap();

        assert_eq!(ctx.cursor(), Cursor::new("Start", 1));
        assert_eq!(ctx.history.len(JUMP_HISTORY), 0);
        assert_eq!(ctx.history.len(LABEL_HISTORY), 0);
        assert_eq!(back.did_revert(&mut ctx).unwrap(), Flow::Advance);
    }

    #[test]
    fn extra_tokens_after_the_label_are_ignored() {
        let mut ctx = context();
        ctx.set_cursor(Cursor::new("Start", 1));
        let mut jump = invocation(&ctx, "jump Next now");

        jump.will_apply(&mut ctx).unwrap();
        jump.apply(&mut ctx, true).unwrap();

        assert_eq!(ctx.cursor(), Cursor::new("Next", 0));
        assert_eq!(
            ctx.history.peek(JUMP_HISTORY),
            Some(&json!({"from": "Start", "to": "Next", "step": 1}))
        );
    }

    #[test]
    fn templated_jump_keeps_reverting_past_itself() {
        let script = Script::from_value(
            json!({
                "Start": ["Bob: Hello", "{{cmd}} Next"],
                "Next": ["Bob: Welcome"]
            }),
            false,
        )
        .unwrap();
        let mut ctx = Context::new(script, Registry::new().with(Jump), Settings::default());
        Jump.setup(&mut ctx).unwrap();
        ctx.storage.set("cmd", "jump");
        ctx.set_cursor(Cursor::new("Start", 1));
        invocation(&ctx, "jump Next").apply(&mut ctx, true).unwrap();

        let mut back = invocation(&ctx, "jump Next");
        back.revert(&mut ctx).unwrap();

        assert_eq!(ctx.cursor(), Cursor::new("Start", 1));
        assert_eq!(back.did_revert(&mut ctx).unwrap(), Flow::Advance);
    }

    #[test]
    fn revert_without_history_is_rejected() {
        let mut ctx = context();
        let err = invocation(&ctx, "jump Next").revert(&mut ctx).unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn unknown_label_is_reported_with_suggestions() {
        let reporter = std::sync::Arc::new(shiori_engine::CollectingReporter::new());
        let script = Script::from_value(json!({"Start": ["jump Nxet"], "Next": []}), false).unwrap();
        let mut engine = shiori_engine::Engine::new(script, Registry::new().with(Jump), Settings::default())
            .with_reporter(reporter.clone());
        engine.setup().unwrap();

        let err = engine.start().unwrap_err();

        assert!(matches!(err, EngineError::UnresolvedTarget { ref label } if label == "Nxet"));
        let reports = reporter.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].title, "Label not found");
        assert_eq!(reports[0].detail("Did you mean"), Some("Next"));
        assert_eq!(engine.cursor(), Cursor::new("Start", 0));
    }

    #[test]
    fn revert_origin_only_at_label_start() {
        let mut ctx = context();
        ctx.set_cursor(Cursor::new("Start", 1));
        invocation(&ctx, "jump Next").apply(&mut ctx, true).unwrap();

        assert_eq!(
            Jump.revert_origin(&ctx).and_then(|s| s.as_text().map(String::from)),
            Some("jump Next".to_string())
        );
        ctx.state.step = 1;
        assert!(Jump.revert_origin(&ctx).is_none());
    }
}
