//! Dialog lines: character speech, narration, centered text and NVL pages.
//!
//! `Dialog` accepts every text statement, so it must be registered last.
//! The first token selects the voice:
//!
//! - `id` or `id:expression` of a known character speaks the rest of the line
//! - `centered` shows the rest of the line in the middle of the screen
//! - `nvl` narrates the rest of the line onto the NVL page
//! - anything else is narrated as written
//!
//! NVL lines accumulate on a page until a regular line replaces it. The page
//! is kept in the `nvl` history so going back can show it again.

mod character;

use std::collections::BTreeMap;

use serde_json::Value;
use shiori_engine::{
    Action, Context, Effect, EngineError, EngineResult, Flow, Invocation, Line, Parsed, Speaker,
};

pub use character::Character;

/// History category holding closed NVL pages.
pub const NVL_HISTORY: &str = "nvl";

const NVL_MODE: &str = "dialog.nvl";
const NVL_PAGE: &str = "dialog.page";

/// Whether the NVL page is showing.
pub fn nvl_mode(ctx: &Context) -> bool {
    ctx.globals
        .get(NVL_MODE)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Lines on the NVL page, oldest first.
pub fn nvl_page(ctx: &Context) -> Vec<Line> {
    ctx.globals
        .get(NVL_PAGE)
        .cloned()
        .and_then(|page| serde_json::from_value(page).ok())
        .unwrap_or_default()
}

fn set_nvl_page(ctx: &mut Context, lines: &[Line]) -> EngineResult<()> {
    ctx.globals.set(NVL_PAGE, serde_json::to_value(lines)?);
    Ok(())
}

fn leave_nvl(ctx: &mut Context) {
    ctx.globals.set(NVL_MODE, false);
    ctx.globals.remove(NVL_PAGE);
}

/// Clear the text box and leave NVL mode without keeping the page.
pub(crate) fn reset_dialog(ctx: &mut Context) -> Vec<Effect> {
    leave_nvl(ctx);
    vec![Effect::ClearText]
}

/// Descriptor for dialog lines, holding the declared characters.
#[derive(Debug, Default)]
pub struct Dialog {
    characters: BTreeMap<String, Character>,
}

impl Dialog {
    /// Dialog with no known characters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one character under `id`.
    pub fn with_character(mut self, id: impl Into<String>, character: Character) -> Self {
        self.characters.insert(id.into(), character);
        self
    }

    /// Register many characters.
    pub fn with_characters(mut self, characters: BTreeMap<String, Character>) -> Self {
        self.characters.extend(characters);
        self
    }

    /// The character registered as `id`.
    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }
}

impl Action for Dialog {
    fn id(&self) -> &str {
        "dialog"
    }

    fn match_string(&self, tokens: &[&str]) -> bool {
        !tokens.is_empty()
    }

    fn instantiate(&self, parsed: &Parsed<'_>, ctx: &Context) -> EngineResult<Box<dyn Invocation>> {
        let settings = &ctx.settings;
        let first = parsed.token(0).unwrap_or_default();
        let (id, expression) = first.split_once(':').unwrap_or((first, ""));
        let expression = (!expression.is_empty()).then_some(expression);

        let say = if let Some(character) = self.characters.get(id) {
            let nvl = character.nvl;
            Say {
                voice: Voice::Character(Speaker {
                    id: id.to_string(),
                    name: ctx.substitute(&character.name)?,
                    color: character.color.clone(),
                    image: if nvl { None } else { character.image(expression) },
                }),
                text: parsed.body().to_string(),
                nvl,
                animate: settings.type_animation
                    && character.type_animation.unwrap_or(true)
                    && (!nvl || settings.nvl_type_animation),
            }
        } else if first == "centered" {
            Say {
                voice: Voice::Centered,
                text: parsed.body().to_string(),
                nvl: false,
                animate: settings.type_animation && settings.centered_type_animation,
            }
        } else {
            let nvl = first == "nvl";
            Say {
                voice: Voice::Narrator,
                text: if nvl {
                    parsed.body().to_string()
                } else {
                    parsed.text().trim().to_string()
                },
                nvl,
                animate: settings.type_animation
                    && settings.narrator_type_animation
                    && (!nvl || settings.nvl_type_animation),
            }
        };
        Ok(Box::new(say))
    }

    fn setup(&self, ctx: &mut Context) -> EngineResult<()> {
        ctx.history.category(NVL_HISTORY);
        Ok(())
    }

    fn reset(&self, ctx: &mut Context) -> EngineResult<()> {
        leave_nvl(ctx);
        ctx.globals.finished_typing = true;
        Ok(())
    }

    /// A line still being typed is finished first instead of moving on.
    fn can_proceed(&self, ctx: &mut Context) -> bool {
        if ctx.globals.finished_typing {
            return true;
        }
        ctx.globals.finished_typing = true;
        ctx.emit(Effect::FinishTyping);
        false
    }

    fn can_revert(&self, ctx: &mut Context) -> bool {
        if !ctx.globals.finished_typing {
            ctx.globals.finished_typing = true;
            ctx.emit(Effect::FinishTyping);
        }
        true
    }
}

#[derive(Debug, Clone)]
enum Voice {
    Character(Speaker),
    Narrator,
    Centered,
}

#[derive(Debug)]
struct Say {
    voice: Voice,
    text: String,
    nvl: bool,
    animate: bool,
}

impl Say {
    fn line(&self) -> Line {
        Line {
            speaker: match &self.voice {
                Voice::Character(speaker) => Some(speaker.name.clone()),
                Voice::Narrator | Voice::Centered => None,
            },
            text: self.text.clone(),
        }
    }

    fn effect(&self) -> Effect {
        match &self.voice {
            Voice::Centered => Effect::Centered {
                text: self.text.clone(),
                animate: self.animate,
            },
            Voice::Character(speaker) => Effect::Say {
                speaker: Some(speaker.clone()),
                text: self.text.clone(),
                nvl: self.nvl,
                animate: self.animate,
            },
            Voice::Narrator => Effect::Say {
                speaker: None,
                text: self.text.clone(),
                nvl: self.nvl,
                animate: self.animate,
            },
        }
    }

    /// Put the line on screen. `keep_page` stores a closing NVL page in
    /// history; `advance` is false when the line is shown again in place.
    fn display(&self, ctx: &mut Context, keep_page: bool, advance: bool) -> EngineResult<Vec<Effect>> {
        let mut effects = Vec::new();
        match (&self.voice, self.nvl) {
            (Voice::Centered, _) => {}
            (_, true) => {
                if !nvl_mode(ctx) {
                    ctx.globals.set(NVL_MODE, true);
                    set_nvl_page(ctx, &[])?;
                    effects.push(Effect::ClearText);
                }
                let line = self.line();
                let mut page = nvl_page(ctx);
                if !advance && page.last() == Some(&line) {
                    return Ok(effects);
                }
                page.push(line);
                set_nvl_page(ctx, &page)?;
            }
            (_, false) => {
                if nvl_mode(ctx) {
                    if keep_page {
                        let page = serde_json::to_value(nvl_page(ctx))?;
                        ctx.history.push(NVL_HISTORY, page);
                    }
                    leave_nvl(ctx);
                    effects.push(Effect::ClearText);
                }
            }
        }
        ctx.globals.finished_typing = !self.animate;
        effects.push(self.effect());
        Ok(effects)
    }
}

impl Invocation for Say {
    fn apply(&mut self, ctx: &mut Context, advance: bool) -> EngineResult<Vec<Effect>> {
        self.display(ctx, true, advance)
    }

    fn did_apply(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(Flow::Wait)
    }

    fn revert(&mut self, ctx: &mut Context) -> EngineResult<Vec<Effect>> {
        if !self.nvl {
            return self.display(ctx, false, true);
        }
        if nvl_mode(ctx) {
            let mut page = nvl_page(ctx);
            page.pop();
            set_nvl_page(ctx, &page)?;
            return Ok(vec![Effect::RemoveLastLine]);
        }
        match ctx.history.pop(NVL_HISTORY) {
            Some(page) => {
                let lines: Vec<Line> = serde_json::from_value(page)?;
                ctx.globals.set(NVL_MODE, true);
                set_nvl_page(ctx, &lines)?;
                Ok(vec![Effect::RestorePage { lines }])
            }
            None => Err(EngineError::rejected_because("no NVL page to restore")),
        }
    }

    fn did_revert(&mut self, _ctx: &mut Context) -> EngineResult<Flow> {
        Ok(Flow::Wait)
    }
}
