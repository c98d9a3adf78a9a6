//! Choice menus.
//!
//! A choice is a record statement:
//!
//! ```json
//! {"Choice": {
//!     "stay": {"Text": "Stay inside", "Do": "next"},
//!     "leave": {"Text": "Go out", "Do": "jump Outside", "Condition": "has_coat"}
//! }}
//! ```
//!
//! Options are offered in the order written. Each `Do` is a statement that
//! runs in place once the player picks the option with [`select`].

mod condition;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shiori_engine::{
    Action, ChoiceView, Context, Effect, Engine, EngineError, EngineResult, Flow, Invocation,
    Parsed, Statement,
};
use tracing::debug;

pub use condition::Condition;

const PENDING: &str = "choice.pending";

/// One option of a choice menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Key in the choice record.
    pub key: String,
    /// Label shown to the player.
    pub text: String,
    /// Statement run when the option is picked.
    pub action: Value,
    /// Hides the option unless it holds.
    #[serde(skip)]
    pub condition: Condition,
}

/// Options waiting for the player, in display order.
pub fn offered(ctx: &Context) -> Vec<MenuItem> {
    ctx.globals
        .get(PENDING)
        .cloned()
        .and_then(|pending| serde_json::from_value(pending).ok())
        .unwrap_or_default()
}

/// Whether a choice menu is waiting for the player.
pub fn is_pending(ctx: &Context) -> bool {
    ctx.globals.get(PENDING).is_some()
}

fn close(ctx: &mut Context) -> bool {
    ctx.globals.remove(PENDING).is_some()
}

/// Pick an offered option and run its statement in place.
pub fn select(engine: &mut Engine, key: &str) -> EngineResult<()> {
    let ctx = engine.context_mut();
    let Some(item) = offered(ctx).into_iter().find(|item| item.key == key) else {
        return Err(EngineError::rejected_because(format!(
            "no option \"{key}\" is offered"
        )));
    };
    close(ctx);
    ctx.emit(Effect::HideChoices);
    debug!(key, "choice selected");
    let statement: Statement = serde_json::from_value(item.action)?;
    engine.run(statement, false)
}

/// Descriptor for `{"Choice": {..}}` records.
#[derive(Debug, Default)]
pub struct Choice;

impl Action for Choice {
    fn id(&self) -> &str {
        "choice"
    }

    fn match_record(&self, record: &serde_json::Map<String, Value>) -> bool {
        record.contains_key("Choice")
    }

    fn instantiate(&self, parsed: &Parsed<'_>, ctx: &Context) -> EngineResult<Box<dyn Invocation>> {
        let options = parsed
            .record()
            .and_then(|record| record.get("Choice"))
            .and_then(Value::as_object)
            .ok_or_else(|| EngineError::rejected_because("a choice needs an object of options"))?;

        let mut items = Vec::new();
        for (key, option) in options {
            let Some(option) = option.as_object() else {
                continue;
            };
            let Some(action) = option.get("Do") else {
                continue;
            };
            let condition = match option.get("Condition") {
                Some(raw) => Condition::from_value(raw).ok_or_else(|| {
                    EngineError::rejected_because(format!("invalid condition on option \"{key}\""))
                })?,
                None => Condition::Always,
            };
            let text = option.get("Text").and_then(Value::as_str).unwrap_or(key.as_str());
            items.push(MenuItem {
                key: key.clone(),
                text: ctx.substitute(text)?,
                action: action.clone(),
                condition,
            });
        }
        Ok(Box::new(Menu { items }))
    }

    fn reset(&self, ctx: &mut Context) -> EngineResult<()> {
        close(ctx);
        Ok(())
    }

    /// The player has to pick an option to move on.
    fn can_proceed(&self, ctx: &mut Context) -> bool {
        !is_pending(ctx)
    }

    fn can_revert(&self, ctx: &mut Context) -> bool {
        if close(ctx) {
            ctx.emit(Effect::HideChoices);
        }
        true
    }
}

#[derive(Debug)]
struct Menu {
    items: Vec<MenuItem>,
}

impl Invocation for Menu {
    fn apply(&mut self, ctx: &mut Context, _advance: bool) -> EngineResult<Vec<Effect>> {
        let visible: Vec<&MenuItem> = self
            .items
            .iter()
            .filter(|item| item.condition.evaluate(&ctx.storage))
            .collect();
        ctx.globals.set(PENDING, serde_json::to_value(&visible)?);
        Ok(vec![Effect::ShowChoices {
            choices: visible
                .iter()
                .map(|item| ChoiceView {
                    key: item.key.clone(),
                    text: item.text.clone(),
                })
                .collect(),
        }])
    }

    fn did_apply(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(Flow::Wait)
    }

    fn revert(&mut self, ctx: &mut Context) -> EngineResult<Vec<Effect>> {
        Ok(if close(ctx) {
            vec![Effect::HideChoices]
        } else {
            Vec::new()
        })
    }

    /// Show the menu again.
    fn did_revert(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(Flow::Enter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shiori_core::Cursor;
    use shiori_engine::{Registry, Script, Settings, transcript};

    use crate::{Dialog, Jump, Next};

    fn engine(storage: Value) -> Engine {
        let script = Script::from_value(
            json!({
                "Start": [
                    "Rain again.",
                    {"Choice": {
                        "stay": {"Text": "Stay inside", "Do": "next"},
                        "leave": {"Text": "Go out", "Do": "jump Outside", "Condition": "has_coat"},
                        "Dialog": "ignored"
                    }},
                    "You stay."
                ],
                "Outside": ["It pours."]
            }),
            false,
        )
        .unwrap();
        let registry = Registry::new()
            .with(Jump)
            .with(Next)
            .with(Choice)
            .with(Dialog::new());
        let mut engine = Engine::new(script, registry, Settings::default().without_animation())
            .with_storage(shiori_core::Storage::from_value(storage));
        engine.setup().unwrap();
        engine.start().unwrap();
        engine.next().unwrap();
        engine
    }

    #[test]
    fn conditions_filter_options() {
        let mut engine = engine(json!({}));
        assert_eq!(
            transcript(&engine.drain_effects()),
            "say Rain again.\nchoices [stay]"
        );

        let engine = engine_with_coat();
        let keys: Vec<String> = offered(engine.context()).into_iter().map(|i| i.key).collect();
        assert_eq!(keys, ["stay", "leave"]);
    }

    fn engine_with_coat() -> Engine {
        engine(json!({"has_coat": true}))
    }

    #[test]
    fn pending_choice_blocks_proceed() {
        let mut engine = engine(json!({}));
        assert!(is_pending(engine.context()));
        assert!(!engine.proceed().unwrap());
        assert_eq!(engine.cursor(), Cursor::new("Start", 1));
    }

    #[test]
    fn selecting_next_moves_past_the_menu() {
        let mut engine = engine(json!({}));
        engine.drain_effects();

        select(&mut engine, "stay").unwrap();

        assert_eq!(engine.cursor(), Cursor::new("Start", 2));
        assert!(!is_pending(engine.context()));
        assert_eq!(transcript(&engine.drain_effects()), "hide-choices\nsay You stay.");
    }

    #[test]
    fn selecting_a_jump_records_the_menu_position() {
        let mut engine = engine_with_coat();
        select(&mut engine, "leave").unwrap();

        assert_eq!(engine.cursor(), Cursor::new("Outside", 0));
        assert_eq!(
            engine.context().history.peek("jump"),
            Some(&json!({"from": "Start", "to": "Outside", "step": 1}))
        );
    }

    #[test]
    fn going_back_after_a_jump_shows_the_menu_again() {
        let mut engine = engine_with_coat();
        select(&mut engine, "leave").unwrap();
        engine.drain_effects();

        engine.revert().unwrap();

        assert_eq!(engine.cursor(), Cursor::new("Start", 1));
        assert!(is_pending(engine.context()));
        assert_eq!(
            transcript(&engine.drain_effects()),
            "clear\nchoices [stay, leave]"
        );
    }

    #[test]
    fn going_back_from_the_menu_hides_it() {
        let mut engine = engine(json!({}));
        engine.drain_effects();

        assert!(engine.rollback().unwrap());

        assert_eq!(engine.cursor(), Cursor::new("Start", 0));
        assert!(!is_pending(engine.context()));
        assert_eq!(
            transcript(&engine.drain_effects()),
            "hide-choices\nsay Rain again."
        );
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut engine = engine(json!({}));
        let err = select(&mut engine, "leave").unwrap_err();
        assert!(err.is_rejection());
        assert!(is_pending(engine.context()));
    }
}
