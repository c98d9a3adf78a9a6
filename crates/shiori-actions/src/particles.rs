//! `particles <preset>`: start a named particle system.

use serde_json::{Map, Value};
use shiori_engine::{
    Action, Context, Effect, EngineError, EngineResult, Invocation, Parsed, Report,
};
use tracing::debug;

use crate::suggest::suggest;

/// History category holding every started particles statement.
pub const PARTICLES_HISTORY: &str = "particles";
/// State variable holding the running particles statement, or `""`.
pub const PARTICLES_STATE: &str = "particles";

/// Descriptor for `particles` statements, holding the named presets.
#[derive(Debug, Default)]
pub struct Particles {
    presets: Map<String, Value>,
}

impl Particles {
    /// No presets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one preset.
    pub fn with_preset(mut self, name: impl Into<String>, config: Value) -> Self {
        self.presets.insert(name.into(), config);
        self
    }

    /// Add many presets.
    pub fn with_presets(mut self, presets: Map<String, Value>) -> Self {
        self.presets.extend(presets);
        self
    }

    /// The preset named `name`.
    pub fn preset(&self, name: &str) -> Option<&Value> {
        self.presets.get(name)
    }

    /// The effect that starts the system named by a `particles` statement.
    fn start_effect(&self, statement: &str) -> Option<Effect> {
        let name = statement.split_whitespace().nth(1)?;
        Some(Effect::Particles {
            name: name.to_string(),
            config: self.presets.get(name)?.clone(),
        })
    }
}

impl Action for Particles {
    fn id(&self) -> &str {
        "particles"
    }

    fn match_string(&self, tokens: &[&str]) -> bool {
        tokens.first() == Some(&"particles")
    }

    fn instantiate(&self, parsed: &Parsed<'_>, ctx: &Context) -> EngineResult<Box<dyn Invocation>> {
        let name = parsed.token(1).unwrap_or_default().to_string();
        let previous = ctx
            .history
            .get(PARTICLES_HISTORY)
            .and_then(|stack| stack.len().checked_sub(2).and_then(|i| stack.get(i)))
            .and_then(Value::as_str)
            .and_then(|statement| Some((statement.to_string(), self.start_effect(statement)?)));
        Ok(Box::new(StartParticles {
            config: self.presets.get(&name).cloned(),
            known: self.presets.keys().cloned().collect(),
            statement: parsed.text().trim().to_string(),
            name,
            previous,
        }))
    }

    fn setup(&self, ctx: &mut Context) -> EngineResult<()> {
        ctx.history.category(PARTICLES_HISTORY);
        ctx.state.set(PARTICLES_STATE, "");
        Ok(())
    }

    fn reset(&self, ctx: &mut Context) -> EngineResult<()> {
        ctx.state.set(PARTICLES_STATE, "");
        Ok(())
    }

    /// Restart the system that was running when the game was saved. The
    /// loaded history already holds its entry.
    fn on_load(&self, ctx: &mut Context) -> EngineResult<()> {
        let running = ctx.state.get_str(PARTICLES_STATE).unwrap_or_default().to_string();
        if running.is_empty() {
            return Ok(());
        }
        match self.start_effect(&running) {
            Some(effect) => ctx.emit(effect),
            None => debug!(statement = %running, "saved particles preset no longer exists"),
        }
        Ok(())
    }
}

#[derive(Debug)]
struct StartParticles {
    name: String,
    config: Option<Value>,
    known: Vec<String>,
    statement: String,
    /// The system that was running before this one, restored on revert.
    previous: Option<(String, Effect)>,
}

impl Invocation for StartParticles {
    fn will_apply(&mut self, ctx: &mut Context) -> EngineResult<()> {
        if self.config.is_some() {
            return Ok(());
        }
        let mut report = Report::new(
            "Particles not found",
            format!("The particles \"{}\" could not be shown because no such preset is defined.", self.name),
        )
        .with_detail("Particles", self.name.as_str());
        let suggestions = suggest(&self.name, self.known.iter().map(String::as_str), 3);
        if !suggestions.is_empty() {
            report = report.with_detail("Did you mean", suggestions.join(", "));
        }
        ctx.report(report.with_detail("Statement", self.statement.as_str()));
        Err(EngineError::rejected_because(format!("unknown particles \"{}\"", self.name)))
    }

    fn apply(&mut self, ctx: &mut Context, _advance: bool) -> EngineResult<Vec<Effect>> {
        let Some(config) = self.config.clone() else {
            return Err(EngineError::rejected());
        };
        ctx.history.push(PARTICLES_HISTORY, self.statement.clone());
        ctx.state.set(PARTICLES_STATE, self.statement.clone());
        Ok(vec![Effect::Particles {
            name: self.name.clone(),
            config,
        }])
    }

    fn revert(&mut self, ctx: &mut Context) -> EngineResult<Vec<Effect>> {
        ctx.history.pop(PARTICLES_HISTORY);
        match self.previous.take() {
            Some((statement, effect)) => {
                ctx.state.set(PARTICLES_STATE, statement);
                Ok(vec![Effect::StopParticles, effect])
            }
            None => {
                ctx.state.set(PARTICLES_STATE, "");
                Ok(vec![Effect::StopParticles])
            }
        }
    }
}
