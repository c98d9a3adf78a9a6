use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A speaking character, as declared in a story file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    /// Display name. May contain `{{path}}` placeholders.
    pub name: String,
    /// Hex color for the name, like `#5bcaff`.
    pub color: Option<String>,
    /// Prefix for expression image paths.
    pub directory: Option<String>,
    /// Expression name to image file.
    pub expressions: BTreeMap<String, String>,
    /// Image file shown when a line names no expression.
    pub default_expression: Option<String>,
    /// Every line of this character goes to the NVL page.
    pub nvl: bool,
    /// Overrides whether this character's lines are animated.
    pub type_animation: Option<bool>,
}

impl Character {
    /// A character shown as `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the name color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the image directory.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Map an expression to an image file.
    pub fn with_expression(mut self, name: impl Into<String>, file: impl Into<String>) -> Self {
        self.expressions.insert(name.into(), file.into());
        self
    }

    /// Image used when no expression is given.
    pub fn with_default_expression(mut self, file: impl Into<String>) -> Self {
        self.default_expression = Some(file.into());
        self
    }

    /// Speak on the NVL page by default.
    pub fn with_nvl(mut self, nvl: bool) -> Self {
        self.nvl = nvl;
        self
    }

    /// Side image for a line. A named expression must exist; without one
    /// the default expression is used.
    pub fn image(&self, expression: Option<&str>) -> Option<String> {
        let file = match expression {
            Some(expression) => self.expressions.get(expression)?,
            None => self.default_expression.as_ref()?,
        };
        Some(match &self.directory {
            Some(directory) => format!("{directory}/{file}"),
            None => file.clone(),
        })
    }
}
