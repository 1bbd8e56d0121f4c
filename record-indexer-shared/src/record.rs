//! The nested record type that flows from repositories to the search index.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identity field every record carries once it leaves a repository.
pub const IDENTITY_FIELD: &str = "id";

/// One structured document fetched from a repository.
///
/// An arbitrarily nested mapping of string keys to scalars, arrays or nested
/// mappings. Repository adapters normalize their source-specific identity field
/// into [`IDENTITY_FIELD`] before handing records out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataRecord(Map<String, Value>);

impl DataRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Build a batch of records from a JSON array.
    ///
    /// Returns `None` when the value is not an array or any element is not an
    /// object, so a malformed page is rejected as a whole.
    pub fn batch_from_value(value: Value) -> Option<Vec<Self>> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            _ => None,
        }
    }

    /// The record identity, if present. Numeric identities are rendered as strings.
    pub fn id(&self) -> Option<String> {
        match self.0.get(IDENTITY_FIELD)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Move the value stored under `source_field` into the identity field.
    ///
    /// Records without `source_field` are returned unchanged.
    pub fn with_identity_from(mut self, source_field: &str) -> Self {
        if source_field == IDENTITY_FIELD {
            return self;
        }
        if let Some(value) = self.0.remove(source_field) {
            self.0.insert(IDENTITY_FIELD.to_string(), value);
        }
        self
    }

    /// Get a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a top-level field as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for DataRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
