//! Free-form event metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Key/value pairs attached to an event.
///
/// Values are arbitrary JSON. Keys are kept sorted so two maps with the
/// same entries serialize and hash identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, JsonValue>);

impl Metadata {
    /// Creates empty metadata.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds an entry, consuming and returning self for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts an entry, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Option<JsonValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the raw JSON value for a key.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Returns the string form of the value for a key.
    ///
    /// JSON strings come back without quotes; every other value uses its
    /// JSON text (`3600`, `true`, `null`, `{"a":1}`).
    pub fn value_as_string(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|value| match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }
}

// Must agree with JsonValue's PartialEq, which treats -0.0 and 0.0 as equal.
impl Hash for Metadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for (key, value) in &self.0 {
            key.hash(state);
            hash_value(value, state);
        }
    }
}

fn hash_value<H: Hasher>(value: &JsonValue, state: &mut H) {
    match value {
        JsonValue::Null => 0u8.hash(state),
        JsonValue::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        JsonValue::Number(n) => {
            2u8.hash(state);
            hash_number(n, state);
        }
        JsonValue::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        JsonValue::Array(items) => {
            4u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_value(item, state);
            }
        }
        JsonValue::Object(map) => {
            5u8.hash(state);
            map.len().hash(state);
            // Object equality ignores entry order.
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                key.hash(state);
                hash_value(item, state);
            }
        }
    }
}

fn hash_number<H: Hasher>(n: &Number, state: &mut H) {
    if let Some(u) = n.as_u64() {
        0u8.hash(state);
        u.hash(state);
    } else if let Some(i) = n.as_i64() {
        1u8.hash(state);
        i.hash(state);
    } else if let Some(f) = n.as_f64() {
        2u8.hash(state);
        let f = if f == 0.0 { 0.0 } else { f };
        f.to_bits().hash(state);
    }
}

impl From<BTreeMap<String, JsonValue>> for Metadata {
    fn from(map: BTreeMap<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
