use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Session-scoped symbol table sent with every submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableDictionary {
    entries: BTreeMap<String, Value>,
}

impl VariableDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(name.into(), value)
    }

    /// Records an assignment returned by the evaluator. Numeric text is
    /// stored as a JSON number so the service sees `x: 5` rather than `"5"`.
    pub fn assign(&mut self, name: &str, result: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let value = numeric_value(result).unwrap_or_else(|| Value::String(result.to_string()));
        tracing::debug!(name, %value, "variable assigned");
        self.entries.insert(name.to_string(), value);
    }
}

fn numeric_value(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
