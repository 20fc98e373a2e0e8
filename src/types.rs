//! Core types for the record repository.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Field name to value mapping carried by a record.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Opaque identifier for a record (assigned by the repository).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

/// Identity of the subject that dispatched an event.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectId(pub u64);

static NEXT_SUBJECT_ID: AtomicU64 = AtomicU64::new(1);

impl SubjectId {
    /// Allocate a process-unique subject identity.
    pub fn next() -> Self {
        SubjectId(NEXT_SUBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubjectId({})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single record managed by the repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier (assigned at creation, never changes).
    pub id: RecordId,

    /// Application-defined fields.
    pub fields: Fields,
}

impl Record {
    /// Create a record from an identifier and its fields.
    pub fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Merge `fields` into this record. Later keys overwrite, the rest is kept.
    pub fn merge(&mut self, fields: Fields) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    /// Look up a single field.
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.fields.get(field)
    }
}

impl AsRef<RecordId> for Record {
    fn as_ref(&self) -> &RecordId {
        &self.id
    }
}

impl AsRef<RecordId> for RecordId {
    fn as_ref(&self) -> &RecordId {
        self
    }
}

/// Build a `Fields` map from a `serde_json::json!` object literal.
///
/// Anything that isn't an object yields an empty map.
pub fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Fields::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_overwrites_and_preserves() {
        let mut record = Record::new(
            RecordId::from("a"),
            fields(json!({"name": "John", "email": "j@example.com"})),
        );

        record.merge(fields(json!({"name": "Jane", "age": 30})));

        assert_eq!(record.get("name"), Some(&json!("Jane")));
        assert_eq!(record.get("email"), Some(&json!("j@example.com")));
        assert_eq!(record.get("age"), Some(&json!(30)));
        assert_eq!(record.id, RecordId::from("a"));
    }

    #[test]
    fn test_subject_ids_are_unique() {
        let a = SubjectId::next();
        let b = SubjectId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fields_from_non_object() {
        assert!(fields(json!([1, 2, 3])).is_empty());
    }
}
