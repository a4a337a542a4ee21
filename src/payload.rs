//! Recursive wrapper over decoded JSON response bodies.
//!
//! Objects become key-addressable records, arrays are wrapped
//! element-wise, and [`Payload::to_value`] unwraps back to plain
//! `serde_json::Value` losslessly.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Payload>),
    Object(BTreeMap<String, Payload>),
}

impl Payload {
    /// Wrap a decoded JSON value, recursively.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Payload::Null,
            serde_json::Value::Bool(b) => Payload::Bool(b),
            serde_json::Value::Number(n) => Payload::Number(n),
            serde_json::Value::String(s) => Payload::String(s),
            serde_json::Value::Array(items) => {
                Payload::Array(items.into_iter().map(Payload::from_value).collect())
            }
            serde_json::Value::Object(fields) => Payload::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Payload::from_value(v)))
                    .collect(),
            ),
        }
    }

    /// Unwrap back to plain data. Round-trips with [`Payload::from_value`]
    /// for any JSON-compatible input.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Payload::Null => serde_json::Value::Null,
            Payload::Bool(b) => serde_json::Value::Bool(*b),
            Payload::Number(n) => serde_json::Value::Number(n.clone()),
            Payload::String(s) => serde_json::Value::String(s.clone()),
            Payload::Array(items) => {
                serde_json::Value::Array(items.iter().map(Payload::to_value).collect())
            }
            Payload::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }

    /// Field access by key. `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        match self {
            Payload::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Element access by index. `None` out of bounds and for non-arrays.
    pub fn at(&self, index: usize) -> Option<&Payload> {
        match self {
            Payload::Array(items) => items.get(index),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Payload::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Payload::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Payload::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Payload::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::from_value(value)
    }
}

impl From<&Payload> for serde_json::Value {
    fn from(payload: &Payload) -> Self {
        payload.to_value()
    }
}

impl std::ops::Index<&str> for Payload {
    type Output = Payload;

    fn index(&self, key: &str) -> &Payload {
        static NULL: Payload = Payload::Null;
        self.get(key).unwrap_or(&NULL)
    }
}

impl std::ops::Index<usize> for Payload {
    type Output = Payload;

    fn index(&self, index: usize) -> &Payload {
        static NULL: Payload = Payload::Null;
        self.at(index).unwrap_or(&NULL)
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[test]
fn test_field_access() {
    let payload = Payload::from_value(serde_json::json!({
        "key": "PROJ",
        "lead": {"name": "admin", "active": true},
        "versions": [{"id": 1}, {"id": 2}],
    }));
    assert_eq!(payload["key"].as_str(), Some("PROJ"));
    assert_eq!(payload["lead"]["name"].as_str(), Some("admin"));
    assert_eq!(payload["lead"]["active"].as_bool(), Some(true));
    assert_eq!(payload["versions"][1]["id"].as_i64(), Some(2));
    assert!(payload["missing"].is_null());
}
