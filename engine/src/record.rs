//! Record type and tolerant decoding of stored snapshots.
//!
//! Records are open JSON objects owned by the hosting application. The engine
//! only reads two things from them: the category's identity field, and the
//! `timestamp` field (milliseconds since epoch) that merge ordering depends
//! on.

use crate::{error::Error, Category, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field carrying the last-modified time, in milliseconds since epoch.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// A business record: an open mapping of field names to JSON values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Value of the category's identity field, if present.
    pub fn identity(&self, category: Category) -> Option<&Value> {
        self.0.get(category.identity_field())
    }

    /// Check whether two records refer to the same entity of a category.
    ///
    /// Records with no identity value never match anything, themselves
    /// included.
    pub fn same_identity(&self, other: &Record, category: Category) -> bool {
        match (self.identity(category), other.identity(category)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Last-modified time in milliseconds since epoch.
    ///
    /// Records without a usable `timestamp` field sort as 0, i.e. older than
    /// everything that carries one.
    pub fn timestamp(&self) -> Timestamp {
        self.0
            .get(TIMESTAMP_FIELD)
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Assign `now` as the timestamp when the record has none.
    pub fn ensure_timestamp(&mut self, now: Timestamp) {
        if self.timestamp() == 0 {
            self.0.insert(TIMESTAMP_FIELD.to_string(), now.into());
        }
    }

    /// Consume the record, yielding the underlying JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Record(map)),
            _ => Err(Error::NotAnObject),
        }
    }
}

/// Decode a stored snapshot value into records, failing open.
///
/// An array yields its object elements, a lone object yields one record
/// (the config singleton case), anything else yields no records. Non-object
/// array elements are dropped rather than reported.
pub fn records_from_value(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| Record::try_from(item).ok())
            .collect(),
        Value::Object(map) => vec![Record(map)],
        _ => Vec::new(),
    }
}

/// Encode records back into the shape the category persists.
///
/// Singleton categories store a bare object (or null when empty); the rest
/// store an array.
pub fn records_to_value(category: Category, records: Vec<Record>) -> Value {
    if category.is_singleton() {
        records
            .into_iter()
            .next()
            .map(Record::into_value)
            .unwrap_or(Value::Null)
    } else {
        Value::Array(records.into_iter().map(Record::into_value).collect())
    }
}
