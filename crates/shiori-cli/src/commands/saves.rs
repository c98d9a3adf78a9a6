use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use shiori_engine::{Engine, Registry, Script, Settings, SlotKind};

pub fn run(dir: &Path, auto: bool) -> Result<(), String> {
    let store = super::open_store(dir)?;
    let engine = Engine::new(Script::default(), Registry::new(), Settings::default());
    let kind = if auto { SlotKind::Auto } else { SlotKind::Manual };
    let slots = engine.list_slots(&store, kind).map_err(|e| e.to_string())?;

    if slots.is_empty() {
        println!("  No saved games.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slot", "Key", "Name", "Date", "Position"]);

    for entry in &slots {
        table.add_row(vec![
            entry.id.to_string(),
            entry.key.clone(),
            entry.slot.name.clone(),
            entry.slot.date.clone(),
            entry.slot.snapshot.state.cursor().to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} slot{}",
        slots.len(),
        if slots.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
