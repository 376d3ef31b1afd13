//! Evaluated records and JSONL loading

pub mod loader;

pub use loader::{discover_jsonl_files, open_jsonl, JsonlRecords, LineError, LineOutcome, LoadError};

use serde_json::{Map, Value};

/// One evaluated question/answer instance.
///
/// Wraps the JSON object read from a single line. Field values keep their
/// original JSON types; extraction decides what it can use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from any JSON value. Anything other than an object
    /// becomes a record with no fields.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Parse a single JSON line
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Value>(line).map(Self::from_value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `target` field as text. Strings are taken as-is, other scalars by
    /// their JSON text, null or a missing field as empty.
    pub fn target_text(&self) -> String {
        match self.fields.get("target") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// `true` only when the record carries `"is_correct": true`
    pub fn self_reported_correct(&self) -> bool {
        matches!(self.fields.get("is_correct"), Some(Value::Bool(true)))
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_becomes_empty_record() {
        assert!(Record::from_value(json!([1, 2, 3])).is_empty());
        assert!(Record::from_value(json!("(A)")).is_empty());
        assert!(Record::parse("null").unwrap().is_empty());
    }

    #[test]
    fn test_target_text() {
        assert_eq!(Record::from(json!({"target": "  (C) "})).target_text(), "(C)");
        assert_eq!(Record::from(json!({"target": 3})).target_text(), "3");
        assert_eq!(Record::from(json!({"target": null})).target_text(), "");
        assert_eq!(Record::from(json!({})).target_text(), "");
    }

    #[test]
    fn test_self_reported_correct() {
        assert!(Record::from(json!({"is_correct": true})).self_reported_correct());
        assert!(!Record::from(json!({"is_correct": "true"})).self_reported_correct());
        assert!(!Record::from(json!({"is_correct": false})).self_reported_correct());
        assert!(!Record::from(json!({})).self_reported_correct());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(Record::parse("{\"target\": ").is_err());
    }
}
