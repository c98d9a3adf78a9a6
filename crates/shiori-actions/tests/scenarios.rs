//! End-to-end runs of the built-in actions through the engine.

use std::collections::BTreeMap;

use insta::assert_snapshot;
use proptest::prelude::*;
use serde_json::{Map, Value, json};
use shiori_actions::{Character, choice, default_registry};
use shiori_core::{Cursor, Storage};
use shiori_engine::{Engine, MemoryStore, Script, Settings, transcript};

fn engine(script: Value) -> Engine {
    let mut characters = BTreeMap::new();
    characters.insert("Bob".to_string(), Character::new("Bob"));
    let mut presets = Map::new();
    presets.insert("snow".into(), json!({"count": 80}));
    presets.insert("rain".into(), json!({"count": 300}));

    let script = Script::from_value(script, false).unwrap();
    let mut engine = Engine::new(
        script,
        default_registry(characters, presets),
        Settings::default().without_animation(),
    );
    engine.setup().unwrap();
    engine
}

fn welcome() -> Engine {
    engine(json!({
        "Start": ["Bob: Hello", "jump Next"],
        "Next": ["Bob: Welcome"]
    }))
}

#[test]
fn jump_enters_the_target_label() {
    let mut engine = welcome();
    engine.start().unwrap();
    engine.next().unwrap();

    assert_eq!(engine.cursor(), Cursor::new("Next", 0));
    assert_eq!(
        engine.context().history.get("jump"),
        Some(&[json!({"from": "Start", "to": "Next", "step": 1})][..])
    );
    assert_eq!(engine.context().history.get("label"), Some(&[json!("Next")][..]));
    assert_snapshot!(transcript(&engine.drain_effects()), @r"
say [Bob] Hello
clear
say [Bob] Welcome
");
}

#[test]
fn revert_after_jump_returns_through_the_jump() {
    let mut engine = welcome();
    engine.start().unwrap();
    engine.next().unwrap();
    engine.drain_effects();

    assert!(engine.rollback().unwrap());

    // The jump at Start:1 is undone and going back continues to the line
    // before it.
    assert_eq!(engine.context().history.len("jump"), 0);
    assert_eq!(engine.context().history.len("label"), 0);
    assert_eq!(engine.cursor(), Cursor::new("Start", 0));
    assert_snapshot!(transcript(&engine.drain_effects()), @r"
clear
say [Bob] Hello
");

    // Forward again replays the jump.
    assert!(engine.proceed().unwrap());
    assert_eq!(engine.cursor(), Cursor::new("Next", 0));
    assert_eq!(engine.context().history.len("jump"), 1);
}

#[test]
fn next_continues_without_input() {
    let mut engine = engine(json!({"Start": ["next", "Bob: Hello"]}));
    engine.start().unwrap();

    assert_eq!(engine.cursor(), Cursor::new("Start", 1));
    assert_snapshot!(transcript(&engine.drain_effects()), @"say [Bob] Hello");
}

#[test]
fn revert_at_the_first_line_stays_put() {
    let mut engine = engine(json!({"Start": ["Bob: Hello", "Bob: Bye"]}));
    engine.start().unwrap();
    engine.drain_effects();

    assert!(engine.rollback().unwrap());

    assert_eq!(engine.cursor(), Cursor::new("Start", 0));
    assert_snapshot!(transcript(&engine.drain_effects()), @"say [Bob] Hello");
}

#[test]
fn cyclic_jumps_hit_the_chain_limit() {
    let mut engine = engine(json!({
        "Start": ["jump Loop"],
        "Loop": ["jump Start"]
    }));
    let err = engine.start().unwrap_err();
    assert!(matches!(
        err,
        shiori_engine::EngineError::ChainLimit { limit: 10_000, .. }
    ));
}

#[test]
fn choice_branches_and_comes_back() {
    let mut engine = engine(json!({
        "Start": [
            "Bob: Coffee or tea?",
            {"Choice": {
                "coffee": {"Text": "Coffee", "Do": "jump Coffee"},
                "tea": {"Text": "Tea", "Do": "jump Tea"}
            }}
        ],
        "Coffee": ["Bob: Strong choice."],
        "Tea": ["Bob: Calming."]
    }));
    engine.start().unwrap();
    engine.next().unwrap();
    choice::select(&mut engine, "tea").unwrap();
    assert_eq!(engine.cursor(), Cursor::new("Tea", 0));

    engine.revert().unwrap();
    assert_eq!(engine.cursor(), Cursor::new("Start", 1));

    choice::select(&mut engine, "coffee").unwrap();
    assert_eq!(engine.cursor(), Cursor::new("Coffee", 0));
    assert_snapshot!(transcript(&engine.drain_effects()), @r"
say [Bob] Coffee or tea?
choices [coffee, tea]
hide-choices
clear
say [Bob] Calming.
clear
choices [coffee, tea]
hide-choices
clear
say [Bob] Strong choice.
");
}

#[test]
fn nvl_page_survives_going_back() {
    let mut engine = engine(json!({
        "Start": ["nvl The house was quiet.", "nvl Too quiet.", "Bob: Hello?"]
    }));
    engine.start().unwrap();
    engine.next().unwrap();
    engine.next().unwrap();
    engine.revert().unwrap();
    engine.revert().unwrap();

    assert_eq!(engine.cursor(), Cursor::new("Start", 0));
    assert_snapshot!(transcript(&engine.drain_effects()), @r"
clear
say nvl The house was quiet.
say nvl Too quiet.
clear
say [Bob] Hello?
restore-page (2 lines)
remove-line
");
}

#[test]
fn loading_restores_particles_and_position() {
    let mut store = MemoryStore::new();
    let mut engine = engine(json!({
        "Start": ["particles snow", "Bob: Hello", "Bob: Bye"]
    }));
    engine.start().unwrap();
    engine.next().unwrap();
    let key = engine.save(&mut store, Some("Snowy")).unwrap().unwrap();
    assert_eq!(key, "Save_1");

    let mut fresh = self::engine(json!({
        "Start": ["particles snow", "Bob: Hello", "Bob: Bye"]
    }));
    fresh.load_from_slot(&store, &key).unwrap();

    assert_eq!(fresh.cursor(), Cursor::new("Start", 2));
    assert_eq!(fresh.context().history.len("particles"), 1);
    assert_eq!(fresh.context().state.get_str("particles"), Some("particles snow"));
    assert_snapshot!(transcript(&fresh.drain_effects()), @r"
particles snow
say [Bob] Bye
");
}

#[test]
fn substitution_reaches_every_action() {
    let mut engine = engine(json!({
        "Start": ["Bob: Hi {{player.name}}", "jump {{route}}"],
        "North": ["Cold wind."]
    }))
    .with_storage(Storage::from_value(json!({
        "player": {"name": "Aiko"},
        "route": "North"
    })));
    engine.start().unwrap();
    engine.next().unwrap();

    assert_eq!(engine.cursor(), Cursor::new("North", 0));
    assert_snapshot!(transcript(&engine.drain_effects()), @r"
say [Bob] Hi Aiko
clear
say Cold wind.
");
}

fn statement() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        3 => Just("Bob: line"),
        1 => Just("next"),
        1 => Just("particles snow"),
        1 => Just("particles rain"),
        1 => Just("nvl page line"),
    ]
}

fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{1,8}".prop_map(|label| format!("jump {label}")),
        Just("next".to_string()),
        "(snow|rain|fog)".prop_map(|preset| format!("particles {preset}")),
        "[a-z ]{1,20}".prop_map(|text| format!("Bob: {text}")),
        "[a-z ]{1,20}".prop_map(|text| format!("nvl {text}")),
        "[a-z ]{0,20}",
    ]
}

fn any_record() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"Choice": {"a": {"Text": "A", "Do": "next"}}})),
        Just(json!({"Choice": {}})),
        Just(json!({"Unknown": true})),
    ]
}

fn matched(engine: &Engine, text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    engine
        .context()
        .registry()
        .find_for_tokens(&tokens)
        .map(|action| action.id().to_string())
}

fn matched_record(engine: &Engine, record: &Value) -> Option<String> {
    engine
        .context()
        .registry()
        .find_for_record(record.as_object()?)
        .map(|action| action.id().to_string())
}

proptest! {
    #[test]
    fn forward_then_back_restores_the_snapshot(
        body in prop::collection::vec(statement(), 0..16),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut lines: Vec<Value> = body.iter().map(|s| json!(s)).collect();
        lines.push(json!("The end."));
        let waits = body
            .iter()
            .filter(|s| s.starts_with("Bob") || s.starts_with("nvl"))
            .count()
            + 1;

        let mut engine = engine(json!({ "Start": lines }));
        engine.start().unwrap();
        let origin = engine.snapshot();

        let steps = pick.index(waits);
        for _ in 0..steps {
            prop_assert!(engine.proceed().unwrap());
        }
        for _ in 0..steps {
            prop_assert!(engine.rollback().unwrap());
        }

        prop_assert_eq!(engine.snapshot(), origin);
    }

    #[test]
    fn matching_ignores_game_state(
        texts in prop::collection::vec(any_text(), 1..12),
        records in prop::collection::vec(any_record(), 1..4),
    ) {
        let mut engine = welcome();
        let before: Vec<_> = texts.iter().map(|text| matched(&engine, text)).collect();
        let before_records: Vec<_> = records.iter().map(|record| matched_record(&engine, record)).collect();

        engine.start().unwrap();
        engine.next().unwrap();
        engine.context_mut().storage.set("gold", 5);

        let after: Vec<_> = texts.iter().map(|text| matched(&engine, text)).collect();
        let after_records: Vec<_> = records.iter().map(|record| matched_record(&engine, record)).collect();
        prop_assert_eq!(&before, &after);
        prop_assert_eq!(&before_records, &after_records);

        for (text, id) in texts.iter().zip(&after) {
            prop_assert_eq!(id.is_some(), !text.trim().is_empty());
        }
        for (record, id) in records.iter().zip(&after_records) {
            let expected = record.get("Choice").map(|_| "choice".to_string());
            prop_assert_eq!(id, &expected);
        }
    }
}
