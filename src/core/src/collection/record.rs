//! Record identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a record, taken from its `id` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{}", id),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// A record held by a [`Collection`](super::Collection).
///
/// Two records are the same record when they share a `record_id`. Records
/// without an id fall back to value equality.
pub trait Record: Clone + PartialEq + Send + Sync + 'static {
    fn record_id(&self) -> Option<RecordId>;

    /// Whether `self` and `other` denote the same record.
    fn same_record(&self, other: &Self) -> bool {
        match (self.record_id(), other.record_id()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }
}

impl Record for serde_json::Value {
    fn record_id(&self) -> Option<RecordId> {
        match self.get("id")? {
            serde_json::Value::Number(n) => n.as_i64().map(RecordId::Int),
            serde_json::Value::String(s) => Some(RecordId::Str(s.clone())),
            _ => None,
        }
    }
}
