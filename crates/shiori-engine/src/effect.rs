use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who is speaking a line of dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    /// Character id used in the script.
    pub id: String,
    /// Display name, already substituted.
    pub name: String,
    /// Name color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Side image resolved from the character directory and expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One line kept on an NVL page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Speaker name, or none for narration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// The line itself.
    pub text: String,
}

/// A selectable option presented to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// Key passed back when the option is picked.
    pub key: String,
    /// Label shown to the player.
    pub text: String,
}

/// A command for the rendering host. The engine never renders anything
/// itself; actions return effects and the host drains them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Show a line of text, optionally attributed to a speaker.
    Say {
        /// Who speaks. Narration has none.
        speaker: Option<Speaker>,
        /// Substituted text.
        text: String,
        /// Append to the NVL page instead of replacing the text box.
        nvl: bool,
        /// Whether the host should animate the text.
        animate: bool,
    },
    /// Show text alone in the middle of the screen.
    Centered {
        /// Substituted text.
        text: String,
        /// Whether the host should animate the text.
        animate: bool,
    },
    /// Empty the text box and the NVL page.
    ClearText,
    /// Drop the newest NVL line.
    RemoveLastLine,
    /// Replace the NVL page with previously stored lines.
    RestorePage {
        /// Page contents, oldest first.
        lines: Vec<Line>,
    },
    /// Skip any running text animation.
    FinishTyping,
    /// Offer a choice menu.
    ShowChoices {
        /// Visible options in script order.
        choices: Vec<ChoiceView>,
    },
    /// Close the choice menu.
    HideChoices,
    /// Start a particle system.
    Particles {
        /// Preset name.
        name: String,
        /// Preset configuration, passed through untouched.
        config: Value,
    },
    /// Stop the running particle system.
    StopParticles,
    /// Escape hatch for host-defined actions.
    Custom {
        /// Host-defined effect name.
        kind: String,
        /// Host-defined data.
        payload: Value,
    },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Say {
                speaker, text, nvl, ..
            } => {
                let mode = if *nvl { "nvl " } else { "" };
                match speaker {
                    Some(speaker) => write!(f, "say {mode}[{}] {text}", speaker.name),
                    None => write!(f, "say {mode}{text}"),
                }
            }
            Effect::Centered { text, .. } => write!(f, "centered {text}"),
            Effect::ClearText => f.write_str("clear"),
            Effect::RemoveLastLine => f.write_str("remove-line"),
            Effect::RestorePage { lines } => write!(f, "restore-page ({} lines)", lines.len()),
            Effect::FinishTyping => f.write_str("finish-typing"),
            Effect::ShowChoices { choices } => {
                let keys: Vec<&str> = choices.iter().map(|c| c.key.as_str()).collect();
                write!(f, "choices [{}]", keys.join(", "))
            }
            Effect::HideChoices => f.write_str("hide-choices"),
            Effect::Particles { name, .. } => write!(f, "particles {name}"),
            Effect::StopParticles => f.write_str("stop-particles"),
            Effect::Custom { kind, .. } => write!(f, "custom {kind}"),
        }
    }
}

/// Render effects one per line, for logs and test transcripts.
pub fn transcript(effects: &[Effect]) -> String {
    effects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
