//! Selectable options and their values

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

use crate::schema::is_blank;

/// Value carried by an option: either a number or a string.
///
/// Serialized untagged so `{"value": 3}` and `{"value": "dev"}` both parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(Number),
    Text(String),
}

impl OptionValue {
    /// Convert a form value into an option value.
    ///
    /// Returns `None` for blank values (see [`is_blank`]) and for
    /// arrays/objects, which cannot act as a dependency parameter.
    pub fn from_json(value: &Value) -> Option<Self> {
        if is_blank(value) {
            return None;
        }
        match value {
            Value::String(s) => Some(OptionValue::Text(s.clone())),
            Value::Number(n) => Some(OptionValue::Number(n.clone())),
            Value::Bool(b) => Some(OptionValue::Text(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            OptionValue::Number(n) => Value::Number(n.clone()),
            OptionValue::Text(s) => Value::String(s.clone()),
        }
    }

    /// True when `value` is the JSON form of this option value
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (OptionValue::Number(a), Value::Number(b)) => a == b,
            (OptionValue::Text(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Number(n.into())
    }
}

/// One selectable choice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: OptionValue,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<OptionValue>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Case-insensitive label match used by searchable selects
    pub fn label_contains(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(&needle.to_lowercase())
    }
}
