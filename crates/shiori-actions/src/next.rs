//! `next`: continue to the following statement without waiting for input.

use shiori_engine::{Action, Context, Effect, EngineResult, Flow, Invocation, Parsed};

/// Descriptor for `next` statements.
#[derive(Debug, Default)]
pub struct Next;

impl Action for Next {
    fn id(&self) -> &str {
        "next"
    }

    fn match_string(&self, tokens: &[&str]) -> bool {
        tokens.first() == Some(&"next")
    }

    fn instantiate(&self, _parsed: &Parsed<'_>, _ctx: &Context) -> EngineResult<Box<dyn Invocation>> {
        Ok(Box::new(Continue { moved: false }))
    }
}

#[derive(Debug)]
struct Continue {
    moved: bool,
}

impl Invocation for Continue {
    /// A chain that is not advancing (a choice running `next` in place)
    /// still has to move, so the step is taken here and entered.
    fn apply(&mut self, ctx: &mut Context, advance: bool) -> EngineResult<Vec<Effect>> {
        if !advance {
            let cursor = ctx.cursor();
            let len = ctx.label(&cursor.label).map_or(0, <[_]>::len);
            if cursor.step < len {
                ctx.state.step += 1;
            }
            self.moved = true;
        }
        Ok(Vec::new())
    }

    fn did_apply(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(if self.moved { Flow::Enter } else { Flow::Advance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shiori_core::Cursor;
    use shiori_engine::{Registry, Script, Settings, Statement};

    fn context() -> Context {
        let script = Script::from_value(json!({"Start": ["next", "Hello"]}), false).unwrap();
        Context::new(script, Registry::new().with(Next), Settings::default())
    }

    fn invocation(ctx: &Context) -> Box<dyn Invocation> {
        let statement = Statement::text("next");
        Next.instantiate(&Parsed::new(&statement, "next", &["next"]), ctx)
            .unwrap()
    }

    #[test]
    fn advancing_chain_continues() {
        let mut ctx = context();
        let mut next = invocation(&ctx);
        assert!(next.apply(&mut ctx, true).unwrap().is_empty());
        assert_eq!(next.did_apply(&mut ctx).unwrap(), Flow::Advance);
        assert_eq!(ctx.cursor(), Cursor::new("Start", 0));
    }

    #[test]
    fn in_place_run_moves_and_enters() {
        let mut ctx = context();
        let mut next = invocation(&ctx);
        next.apply(&mut ctx, false).unwrap();
        assert_eq!(next.did_apply(&mut ctx).unwrap(), Flow::Enter);
        assert_eq!(ctx.cursor(), Cursor::new("Start", 1));
    }

    #[test]
    fn reverting_next_keeps_going_back() {
        let mut ctx = context();
        let mut next = invocation(&ctx);
        assert!(next.revert(&mut ctx).unwrap().is_empty());
        assert_eq!(next.did_revert(&mut ctx).unwrap(), Flow::Advance);
    }
}
