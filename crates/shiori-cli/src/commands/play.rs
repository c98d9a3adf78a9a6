use std::io::{self, BufRead, Write};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use shiori_actions::choice;
use shiori_engine::{DirStore, Engine, EngineError, SlotKind};

use crate::render;
use crate::story::Story;

/// Command-line overrides for a play session.
#[derive(Debug, Default)]
pub struct Options {
    pub label: Option<String>,
    pub language: Option<String>,
    pub auto: Option<u32>,
}

const HELP: &str = "  Enter      continue
  back       go back one step
  1, 2, ..   pick a choice
  save NAME  save to a new slot
  load KEY   load a slot
  saves      list save slots
  auto       toggle autoplay
  quit       leave the game";

pub fn run(path: &Path, saves: &Path, options: Options) -> Result<(), String> {
    let mut story = Story::load(path)?;
    if let Some(label) = options.label {
        story.settings.start_label = label;
    }
    let mut engine = story.engine()?;
    let mut store = super::open_store(saves)?;
    engine
        .load_preferences(&mut store)
        .map_err(|e| format!("cannot load preferences: {e}"))?;
    if let Some(language) = options.language {
        engine.context_mut().preferences.language = language;
    }

    println!("  {} {}", "Playing".bold(), path.display());
    println!("  Type 'help' for commands, 'quit' to exit.\n");

    let mut session = Session {
        engine,
        store,
        last_auto_save: Instant::now(),
    };
    let started = session.engine.start();
    if !session.settle(started) {
        return Ok(());
    }
    if let Some(seconds) = options.auto {
        session.engine.context_mut().preferences.auto_play_speed = seconds;
        session.engine.auto_play(true, Instant::now());
        if !session.run_auto_play() {
            return Ok(());
        }
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break, // EOF
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        let (command, argument) = input.split_once(' ').unwrap_or((input, ""));
        let argument = argument.trim();

        let keep_going = match command {
            "" => {
                let moved = session.engine.proceed();
                session.settle(moved.map(|_| ()))
            }
            "back" | "b" => {
                let moved = session.engine.rollback();
                session.settle(moved.map(|_| ()))
            }
            "save" => {
                session.save((!argument.is_empty()).then_some(argument));
                true
            }
            "load" if !argument.is_empty() => {
                let loaded = session.engine.load_from_slot(&session.store, argument);
                session.settle(loaded)
            }
            "load" => {
                println!("  {}", "usage: load KEY".yellow());
                true
            }
            "saves" => {
                session.list();
                true
            }
            "auto" => {
                let enable = !session.engine.auto_play_active();
                session.engine.auto_play(enable, Instant::now());
                if enable {
                    println!("  {}", "autoplay on".dimmed());
                    session.run_auto_play()
                } else {
                    println!("  {}", "autoplay off".dimmed());
                    true
                }
            }
            "help" | "?" => {
                println!("{HELP}");
                true
            }
            "quit" | "q" | "exit" => break,
            number if number.parse::<usize>().is_ok() => {
                let picked = session.pick(number);
                session.settle(picked)
            }
            other => {
                println!("  {}", format!("unknown command '{other}' (try 'help')").yellow());
                true
            }
        };
        if !keep_going {
            break;
        }
    }

    Ok(())
}

struct Session {
    engine: Engine,
    store: DirStore,
    last_auto_save: Instant,
}

impl Session {
    /// Show what the engine produced and report the outcome. Returns false
    /// once the story has nothing left to run.
    fn settle(&mut self, result: Result<(), EngineError>) -> bool {
        render::effects(&self.engine.drain_effects());
        // The terminal prints whole lines at once.
        self.engine.finish_typing();

        match result {
            Ok(()) => {
                self.maybe_auto_save();
                true
            }
            Err(EngineError::NoStatement(_)) => {
                println!("\n  {}", "The End".bold());
                false
            }
            Err(e) => {
                println!("  {}", e.to_string().yellow());
                true
            }
        }
    }

    fn pick(&mut self, number: &str) -> Result<(), EngineError> {
        let offered = choice::offered(self.engine.context());
        let index = number.parse::<usize>().unwrap_or_default();
        match index.checked_sub(1).and_then(|i| offered.get(i)) {
            Some(item) => choice::select(&mut self.engine, &item.key),
            None => Err(EngineError::rejected_because(format!(
                "there is no choice {number}"
            ))),
        }
    }

    fn save(&mut self, name: Option<&str>) {
        match self.engine.save(&mut self.store, name) {
            Ok(Some(key)) => println!("  {}", format!("saved as {key}").green()),
            Ok(None) => println!("  {}", "nothing to save".yellow()),
            Err(e) => println!("  {}", e.to_string().yellow()),
        }
    }

    fn list(&self) {
        match self.engine.list_slots(&self.store, SlotKind::Manual) {
            Ok(slots) if slots.is_empty() => println!("  No saved games."),
            Ok(slots) => {
                for entry in slots {
                    println!(
                        "  {}  {}  {}",
                        entry.key.bold(),
                        entry.slot.name,
                        entry.slot.date.dimmed()
                    );
                }
            }
            Err(e) => println!("  {}", e.to_string().yellow()),
        }
    }

    fn maybe_auto_save(&mut self) {
        let minutes = self.engine.settings().auto_save_minutes;
        if minutes == 0 || self.last_auto_save.elapsed() < Duration::from_secs(u64::from(minutes) * 60) {
            return;
        }
        self.last_auto_save = Instant::now();
        if let Err(e) = self.engine.auto_save(&mut self.store) {
            tracing::warn!(error = %e, "auto-save failed");
        }
    }

    /// Advance on the autoplay timer until something needs the player.
    fn run_auto_play(&mut self) -> bool {
        loop {
            if choice::is_pending(self.engine.context()) {
                self.engine.auto_play(false, Instant::now());
                println!("  {}", "autoplay paused for a choice".dimmed());
                return true;
            }
            match self.engine.tick_auto_play(Instant::now()) {
                Ok(Some(delay)) => {
                    render::effects(&self.engine.drain_effects());
                    self.engine.finish_typing();
                    thread::sleep(delay);
                }
                Ok(None) => return true,
                Err(e) => return self.settle(Err(e)),
            }
        }
    }
}
