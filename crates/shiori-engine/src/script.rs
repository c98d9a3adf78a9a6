//! Statements and the labeled script store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use shiori_core::Cursor;

use crate::context::Context;
use crate::error::EngineResult;

/// Signature of a host callback statement.
pub type CallbackFn = dyn Fn(&mut Context) -> EngineResult<()> + Send + Sync;

/// A host closure embedded in a script.
#[derive(Clone)]
pub struct Callback(Arc<CallbackFn>);

impl Callback {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&mut Context) -> EngineResult<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the closure against the context.
    pub fn call(&self, ctx: &mut Context) -> EngineResult<()> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// One executable unit of a script.
#[derive(Debug, Clone)]
pub enum Statement {
    /// Whitespace-tokenizable instruction, e.g. `"jump Next"` or `"Bob: Hello"`.
    Text(String),
    /// Structured instruction, e.g. `{"Choice": {...}}`.
    Record(Map<String, Value>),
    /// Arbitrary host logic.
    Callback(Callback),
}

impl Statement {
    /// A text statement.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Build a record statement. Non-object values are wrapped as `{"value": ..}`.
    pub fn record(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Record(map),
            other => {
                let mut map = Map::new();
                map.insert("value".into(), other);
                Self::Record(map)
            }
        }
    }

    /// A statement that runs host code.
    pub fn callback(f: impl Fn(&mut Context) -> EngineResult<()> + Send + Sync + 'static) -> Self {
        Self::Callback(Callback::new(f))
    }

    /// The text, for text statements.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The object, for record statements.
    pub fn as_record(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// First whitespace token of a text statement (before substitution).
    pub fn keyword(&self) -> Option<&str> {
        self.as_text().and_then(|text| text.split_whitespace().next())
    }

    /// Short human-readable form for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Record(record) => Value::Object(record.clone()).to_string(),
            Self::Callback(_) => "<callback>".into(),
        }
    }
}

impl From<&str> for Statement {
    fn from(text: &str) -> Self {
        Self::text(text)
    }
}

impl From<String> for Statement {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Record(Map<String, Value>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Statement::Text(text),
            Raw::Record(record) => Statement::Record(record),
        })
    }
}

/// Label name → ordered statements.
pub type Labels = BTreeMap<String, Vec<Statement>>;

/// The script store.
#[derive(Debug, Clone)]
pub enum Script {
    /// One set of labels.
    Single(Labels),
    /// Language → labels; the active language picks the set.
    MultiLanguage(BTreeMap<String, Labels>),
}

impl Default for Script {
    fn default() -> Self {
        Self::Single(Labels::new())
    }
}

impl Script {
    /// Decode a script from JSON. With `multi_language`, the outer keys are
    /// language names.
    pub fn from_value(value: Value, multi_language: bool) -> EngineResult<Self> {
        if multi_language {
            Ok(Self::MultiLanguage(serde_json::from_value(value)?))
        } else {
            Ok(Self::Single(serde_json::from_value(value)?))
        }
    }

    /// Parse a script from JSON text.
    pub fn from_json(text: &str, multi_language: bool) -> EngineResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value, multi_language)
    }

    /// Whether the outer keys are languages.
    pub fn is_multi_language(&self) -> bool {
        matches!(self, Self::MultiLanguage(_))
    }

    /// Labels visible in `language`. Single-language scripts ignore it.
    pub fn labels(&self, language: &str) -> Option<&Labels> {
        match self {
            Self::Single(labels) => Some(labels),
            Self::MultiLanguage(languages) => languages.get(language),
        }
    }

    /// Statements of a label in `language`.
    pub fn label(&self, language: &str, name: &str) -> Option<&[Statement]> {
        self.labels(language)
            .and_then(|labels| labels.get(name))
            .map(Vec::as_slice)
    }

    /// The statement at `cursor` in `language`.
    pub fn statement(&self, language: &str, cursor: &Cursor) -> Option<&Statement> {
        self.label(language, &cursor.label)
            .and_then(|statements| statements.get(cursor.step))
    }

    /// Label names visible in `language`, sorted.
    pub fn label_names(&self, language: &str) -> Vec<&str> {
        self.labels(language)
            .map(|labels| labels.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Languages of a multi-language script, sorted.
    pub fn languages(&self) -> Vec<&str> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::MultiLanguage(languages) => languages.keys().map(String::as_str).collect(),
        }
    }

    /// Define or replace a label. Single-language scripts ignore `language`.
    pub fn set_label(
        &mut self,
        language: &str,
        name: impl Into<String>,
        statements: Vec<Statement>,
    ) {
        match self {
            Self::Single(labels) => {
                labels.insert(name.into(), statements);
            }
            Self::MultiLanguage(languages) => {
                languages
                    .entry(language.to_string())
                    .or_default()
                    .insert(name.into(), statements);
            }
        }
    }

    /// Merge labels from `other` over this script. Labels in `other` win.
    pub fn merge(&mut self, other: Script) {
        match (self, other) {
            (Self::Single(mine), Self::Single(theirs)) => mine.extend(theirs),
            (Self::MultiLanguage(mine), Self::MultiLanguage(theirs)) => {
                for (language, labels) in theirs {
                    mine.entry(language).or_default().extend(labels);
                }
            }
            (Self::MultiLanguage(mine), Self::Single(theirs)) => {
                for labels in mine.values_mut() {
                    labels.extend(theirs.clone());
                }
            }
            (this @ Self::Single(_), other @ Self::MultiLanguage(_)) => *this = other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_single_language() {
        let script = Script::from_value(
            json!({
                "Start": ["Bob: Hello", {"Choice": {"a": {"Text": "A", "Do": "next"}}}, "jump Next"],
                "Next": ["Bob: Welcome"]
            }),
            false,
        )
        .unwrap();

        let start = script.label("ignored", "Start").unwrap();
        assert_eq!(start.len(), 3);
        assert_eq!(start[0].as_text(), Some("Bob: Hello"));
        assert!(start[1].as_record().unwrap().contains_key("Choice"));
        assert_eq!(start[2].keyword(), Some("jump"));
        assert_eq!(script.label_names(""), vec!["Next", "Start"]);
    }

    #[test]
    fn decode_multi_language() {
        let script = Script::from_value(
            json!({
                "English": {"Start": ["Hello"]},
                "Español": {"Start": ["Hola"]}
            }),
            true,
        )
        .unwrap();

        let cursor = Cursor::start("Start");
        assert_eq!(
            script.statement("Español", &cursor).and_then(Statement::as_text),
            Some("Hola")
        );
        assert!(script.label("Deutsch", "Start").is_none());
        assert_eq!(script.languages(), vec!["English", "Español"]);
    }

    #[test]
    fn statement_past_end_is_none() {
        let script = Script::from_value(json!({"Start": ["a"]}), false).unwrap();
        assert!(script.statement("", &Cursor::new("Start", 1)).is_none());
        assert!(script.statement("", &Cursor::new("Missing", 0)).is_none());
    }

    #[test]
    fn invalid_statement_is_rejected() {
        assert!(Script::from_value(json!({"Start": [1, 2]}), false).is_err());
    }

    #[test]
    fn merge_overrides_labels() {
        let mut script = Script::from_value(json!({"Start": ["a"], "Keep": ["k"]}), false).unwrap();
        let other = Script::from_value(json!({"Start": ["b"]}), false).unwrap();
        script.merge(other);
        assert_eq!(script.label("", "Start").unwrap()[0].as_text(), Some("b"));
        assert!(script.label("", "Keep").is_some());
    }

    #[test]
    fn set_label_in_language() {
        let mut script = Script::MultiLanguage(BTreeMap::new());
        script.set_label("English", "Start", vec!["Hi".into()]);
        assert_eq!(script.label("English", "Start").unwrap().len(), 1);
    }

    #[test]
    fn describe_forms() {
        assert_eq!(Statement::text("next").describe(), "next");
        assert_eq!(
            Statement::record(json!({"Choice": {}})).describe(),
            r#"{"Choice":{}}"#
        );
        assert_eq!(Statement::callback(|_| Ok(())).describe(), "<callback>");
    }
}
