use serde::{Deserialize, Serialize};
use shiori_core::UnresolvedPolicy;

/// Engine configuration, fixed for the lifetime of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Label a new game starts at.
    pub start_label: String,
    /// Number of auto-save slots to rotate through.
    pub slots: u32,
    /// Whether the script is keyed by language first.
    pub multi_language: bool,
    /// Key prefix for manual save slots.
    pub save_label: String,
    /// Key prefix for auto-save slots.
    pub auto_save_label: String,
    /// Minutes between auto-saves. 0 disables them.
    pub auto_save_minutes: u32,
    /// Animate character dialog.
    pub type_animation: bool,
    /// Animate narration.
    pub narrator_type_animation: bool,
    /// Animate centered text.
    pub centered_type_animation: bool,
    /// Animate NVL lines.
    pub nvl_type_animation: bool,
    /// What substitution does with unresolved `{{path}}` placeholders.
    pub unresolved: UnresolvedPolicy,
    /// Maximum statements a single run/revert call may execute.
    pub max_chain: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_label: "Start".into(),
            slots: 10,
            multi_language: false,
            save_label: "Save".into(),
            auto_save_label: "AutoSave".into(),
            auto_save_minutes: 0,
            type_animation: true,
            narrator_type_animation: true,
            centered_type_animation: true,
            nvl_type_animation: true,
            unresolved: UnresolvedPolicy::default(),
            max_chain: 10_000,
        }
    }
}

impl Settings {
    /// Label a new game starts at.
    pub fn with_start_label(mut self, label: impl Into<String>) -> Self {
        self.start_label = label.into();
        self
    }

    /// Number of rotating auto-save slots.
    pub fn with_slots(mut self, slots: u32) -> Self {
        self.slots = slots;
        self
    }

    /// Treat the script's outer keys as languages.
    pub fn with_multi_language(mut self, enabled: bool) -> Self {
        self.multi_language = enabled;
        self
    }

    /// Policy for unresolved placeholders.
    pub fn with_unresolved(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved = policy;
        self
    }

    /// Cap on statements per run or revert call.
    pub fn with_max_chain(mut self, max: usize) -> Self {
        self.max_chain = max;
        self
    }

    /// Disable every kind of text animation.
    pub fn without_animation(mut self) -> Self {
        self.type_animation = false;
        self.narrator_type_animation = false;
        self.centered_type_animation = false;
        self.nvl_type_animation = false;
        self
    }
}

/// Player preferences, persisted under the `Settings` store key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Preferences {
    /// Script language for multi-language scripts.
    pub language: String,
    /// Milliseconds per character for text animation.
    pub text_speed: u32,
    /// Seconds between autoplay steps.
    pub auto_play_speed: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "English".into(),
            text_speed: 20,
            auto_play_speed: 5,
        }
    }
}

impl Preferences {
    /// Script language to play.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Seconds between autoplay steps.
    pub fn with_auto_play_speed(mut self, seconds: u32) -> Self {
        self.auto_play_speed = seconds;
        self
    }
}
