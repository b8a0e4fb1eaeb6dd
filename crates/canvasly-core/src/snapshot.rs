//! Snapshot: the field map of one template instance.
//!
//! Field values are either plain text or an ordered list of strings. Anything
//! else found in storage or in an imported file is kept as opaque JSON so it
//! round-trips unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a single template field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    /// Unknown shape, preserved verbatim
    Other(serde_json::Value),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for `""`, `[]` and lists holding only empty strings.
    #[cfg(test)]
    pub(crate) fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
            FieldValue::Other(value) => value.is_null(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// Mapping from field key to value.
///
/// Keys are not restricted to the template's declared fields; extra keys are
/// carried along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, FieldValue>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Text of `key`, empty when absent or not text
    pub fn text(&self, key: &str) -> &str {
        self.0.get(key).and_then(FieldValue::as_text).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// `self` overlaid with every entry of `other` (other wins).
    pub fn overlaid_with(mut self, other: &Snapshot) -> Snapshot {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    /// Build from a parsed JSON object. Every value is accepted.
    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Snapshot {
        let fields = map
            .into_iter()
            .map(|(key, value)| (key, field_from_json(value)))
            .collect();
        Snapshot(fields)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Snapshot(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn field_from_json(value: serde_json::Value) -> FieldValue {
    match value {
        serde_json::Value::String(s) => FieldValue::Text(s),
        serde_json::Value::Array(items) if items.iter().all(|v| v.is_string()) => FieldValue::List(
            items
                .into_iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        other => FieldValue::Other(other),
    }
}
