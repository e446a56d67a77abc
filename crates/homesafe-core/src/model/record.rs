// ── Raw device records ──
//
// The vendor's per-device JSON object, frozen at fetch time. Records are
// shared by `Arc` between snapshots and never mutated after construction.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

/// Immutable, cheaply cloneable view of one device's raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawDeviceRecord(Arc<Map<String, Value>>);

impl RawDeviceRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(Arc::new(fields))
    }

    /// Look up a field. JSON `null` is treated as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Whether the vendor reported the field at all (even as `null`).
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for RawDeviceRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}
