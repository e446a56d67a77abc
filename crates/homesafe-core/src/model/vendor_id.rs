// ── Vendor identifiers ──
//
// Device and location ids arrive as JSON numbers from most endpoints but
// as strings from some. VendorId unifies both behind one hashable key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Canonical identifier for a device or location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VendorId {
    Numeric(i64),
    Text(String),
}

impl VendorId {
    /// Interpret a raw JSON id. Only integers and non-empty strings qualify.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Numeric),
            Value::String(s) if !s.is_empty() => Some(Self::from(s.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for VendorId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for VendorId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

/// Digit strings become `Numeric` only when they render back unchanged,
/// so `"007"` and `"+5"` keep their exact text.
impl From<String> for VendorId {
    fn from(s: String) -> Self {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Self::Numeric(n),
            _ => Self::Text(s),
        }
    }
}

impl From<&str> for VendorId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}
