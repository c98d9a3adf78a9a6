//! Conditions that decide whether a choice is offered.

use serde_json::Value;
use shiori_core::Storage;

/// A condition evaluated against world storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// The value at a dotted storage path is truthy.
    Truthy(String),
    /// The value at a dotted storage path equals a literal.
    Equals {
        /// Storage path.
        path: String,
        /// Expected value.
        value: Value,
    },
    /// Logical NOT.
    Not(Box<Condition>),
    /// Logical AND.
    All(Vec<Condition>),
    /// Logical OR.
    Any(Vec<Condition>),
    /// Always true.
    #[default]
    Always,
}

impl Condition {
    /// Read a condition from its script form.
    ///
    /// - `"met_bob"` is truthy, `"!met_bob"` negated.
    /// - `{"equals": ["route", "north"]}` compares a path with a value.
    /// - `{"not": c}`, `{"all": [c, ..]}` and `{"any": [c, ..]}` combine.
    ///
    /// Returns `None` for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Condition::Always),
            Value::Bool(false) => Some(Condition::Not(Box::new(Condition::Always))),
            Value::String(path) => Some(match path.strip_prefix('!') {
                Some(negated) => Condition::Not(Box::new(Condition::Truthy(negated.to_string()))),
                None => Condition::Truthy(path.clone()),
            }),
            Value::Object(map) if map.len() == 1 => {
                let (key, inner) = map.iter().next()?;
                match key.as_str() {
                    "not" => Some(Condition::Not(Box::new(Condition::from_value(inner)?))),
                    "all" => Some(Condition::All(Self::list(inner)?)),
                    "any" => Some(Condition::Any(Self::list(inner)?)),
                    "equals" => {
                        let pair = inner.as_array()?;
                        match pair.as_slice() {
                            [Value::String(path), value] => Some(Condition::Equals {
                                path: path.clone(),
                                value: value.clone(),
                            }),
                            _ => None,
                        }
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn list(value: &Value) -> Option<Vec<Condition>> {
        value.as_array()?.iter().map(Condition::from_value).collect()
    }

    /// Evaluate the condition against the current storage.
    pub fn evaluate(&self, storage: &Storage) -> bool {
        match self {
            Condition::Truthy(path) => storage.resolve(path).is_some_and(truthy),
            Condition::Equals { path, value } => storage.resolve(path) == Some(value),
            Condition::Not(inner) => !inner.evaluate(storage),
            Condition::All(conditions) => conditions.iter().all(|c| c.evaluate(storage)),
            Condition::Any(conditions) => conditions.iter().any(|c| c.evaluate(storage)),
            Condition::Always => true,
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn storage() -> Storage {
        Storage::from_value(json!({
            "met_bob": true,
            "gold": 0,
            "route": "north",
            "party": {"size": 3}
        }))
    }

    fn eval(condition: Value) -> bool {
        Condition::from_value(&condition)
            .expect("valid condition")
            .evaluate(&storage())
    }

    #[test]
    fn truthy_paths() {
        assert!(eval(json!("met_bob")));
        assert!(!eval(json!("gold")));
        assert!(eval(json!("party.size")));
        assert!(!eval(json!("missing")));
    }

    #[test]
    fn negation() {
        assert!(eval(json!("!gold")));
        assert!(!eval(json!({"not": "met_bob"})));
    }

    #[test]
    fn equality() {
        assert!(eval(json!({"equals": ["route", "north"]})));
        assert!(!eval(json!({"equals": ["route", "south"]})));
        assert!(eval(json!({"equals": ["party.size", 3]})));
    }

    #[test]
    fn combinators() {
        assert!(eval(json!({"all": ["met_bob", "route"]})));
        assert!(!eval(json!({"all": ["met_bob", "gold"]})));
        assert!(eval(json!({"any": ["gold", "met_bob"]})));
        assert!(eval(json!({"all": []})));
        assert!(!eval(json!({"any": []})));
    }

    #[test]
    fn literal_booleans() {
        assert!(eval(json!(true)));
        assert!(!eval(json!(false)));
    }

    #[test]
    fn invalid_forms_are_rejected() {
        assert_eq!(Condition::from_value(&json!(3)), None);
        assert_eq!(Condition::from_value(&json!({"xor": []})), None);
        assert_eq!(Condition::from_value(&json!({"equals": ["a"]})), None);
        assert_eq!(Condition::from_value(&json!({"not": 1})), None);
    }
}
