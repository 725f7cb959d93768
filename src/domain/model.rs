use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One item returned by or submitted to a remote API: a flat field-to-value
/// mapping. No local schema is enforced; fields are read by key through the
/// optional accessors below, so a malformed upstream record degrades
/// per-field instead of failing the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    /// Wraps a JSON object; anything else is not a record.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(map) => Some(Self {
                data: map.into_iter().collect(),
            }),
            _ => None,
        }
    }

    /// Field value, with JSON null treated as absent.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(serde_json::Value::as_str)
    }

    /// Numeric field; numeric strings (CSV-sourced records) parse too.
    pub fn float(&self, key: &str) -> Option<f64> {
        let value = self.get(key)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    }

    /// Boolean field; strings compare case-insensitively against "true".
    pub fn boolean(&self, key: &str) -> Option<bool> {
        let value = self.get(key)?;
        value
            .as_bool()
            .or_else(|| value.as_str().map(|s| s.trim().eq_ignore_ascii_case("true")))
    }

    /// Scalar field rendered as display text. Identifiers come back as
    /// strings or numbers depending on the endpoint; both work in a URL path.
    pub fn display(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
