// ── Field decoders ──
//
// Three total decoders over arbitrary JSON: scalar pass-through, vendor
// timestamps, and `{value, Unit, status}` measurement sub-objects. None of
// them can fail; every fault collapses to "unknown" and is logged.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, IntoStaticStr};
use tracing::{debug, warn};

use crate::model::RawDeviceRecord;
use crate::units::{CanonicalUnit, normalize_unit};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const KEY_VALUE: &str = "value";
const KEY_UNIT: &str = "Unit";
const KEY_STATUS: &str = "status";

/// Which decoder a catalog field is read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DecoderKind {
    Scalar,
    Timestamp,
    Measurement,
}

/// A scalar exactly as the vendor sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects, passed through untouched.
    Structured(Value),
}

impl ScalarValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(
                n.as_i64()
                    .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Integer),
            ),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Structured(other.clone())),
        }
    }

    /// Boolean reading: booleans as-is, integers as non-zero, and the
    /// strings `"true"` / `"false"` in any case.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Integer(n) => Some(*n != 0),
            Self::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Self::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            Self::Integer(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Structured(v) => write!(f, "{v}"),
        }
    }
}

/// Decoded compound measurement. Every part is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Measurement {
    pub value: Option<f64>,
    pub unit: Option<CanonicalUnit>,
    pub status: Option<String>,
}

impl Measurement {
    pub fn is_unknown(&self) -> bool {
        self.value.is_none() && self.unit.is_none() && self.status.is_none()
    }
}

/// The interpreted value of one field under one decoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DecodedField {
    Scalar(Option<ScalarValue>),
    Timestamp(Option<DateTime<Utc>>),
    Measurement(Measurement),
}

impl DecodedField {
    /// `true` when the field resolved to "not reported / not parseable".
    pub fn is_unknown(&self) -> bool {
        match self {
            Self::Scalar(v) => v.is_none(),
            Self::Timestamp(t) => t.is_none(),
            Self::Measurement(m) => m.is_unknown(),
        }
    }

    pub fn kind(&self) -> DecoderKind {
        match self {
            Self::Scalar(_) => DecoderKind::Scalar,
            Self::Timestamp(_) => DecoderKind::Timestamp,
            Self::Measurement(_) => DecoderKind::Measurement,
        }
    }
}

/// Dispatch to the decoder for `kind`.
pub fn decode(record: &RawDeviceRecord, key: &str, kind: DecoderKind) -> DecodedField {
    match kind {
        DecoderKind::Scalar => DecodedField::Scalar(decode_scalar(record, key)),
        DecoderKind::Timestamp => DecodedField::Timestamp(decode_timestamp(record, key)),
        DecoderKind::Measurement => DecodedField::Measurement(decode_measurement(record, key)),
    }
}

/// Plain lookup. Field types vary by model and firmware, so no validation.
pub fn decode_scalar(record: &RawDeviceRecord, key: &str) -> Option<ScalarValue> {
    let value = record.get(key)?;
    debug!(key, %value, "scalar field");
    ScalarValue::from_json(value)
}

/// Decode a vendor timestamp, truncated to whole seconds, as UTC.
///
/// Missing keys are silently unknown; anything unparseable is logged.
pub fn decode_timestamp(record: &RawDeviceRecord, key: &str) -> Option<DateTime<Utc>> {
    let value = record.get(key)?;
    let Some(raw) = value.as_str() else {
        warn!(key, %value, "expected timestamp string");
        return None;
    };

    let parsed = parse_vendor_timestamp(raw);
    if parsed.is_none() {
        warn!(key, raw, "unparseable timestamp");
    }
    parsed
}

/// Parse `YYYY-MM-DDTHH:MM:SS[.fraction]Z`, discarding the fraction.
///
/// The vendor emits anywhere from zero to nine fractional digits
/// depending on the field and model, so the fraction is dropped rather
/// than parsed.
pub fn parse_vendor_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim().trim_end_matches('Z');
    let whole_seconds = trimmed.split('.').next().unwrap_or(trimmed);

    NaiveDateTime::parse_from_str(whole_seconds, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Decode a `{value, Unit, status}` sub-object.
///
/// A non-object value (placeholder on models lacking the capability)
/// yields an all-`None` measurement with a warning.
pub fn decode_measurement(record: &RawDeviceRecord, key: &str) -> Measurement {
    let Some(value) = record.get(key) else {
        return Measurement::default();
    };
    let Value::Object(sub) = value else {
        warn!(key, %value, "expected measurement object");
        return Measurement::default();
    };

    let reading = sub.get(KEY_VALUE).and_then(Value::as_f64);
    if reading.is_none() {
        debug!(key, "measurement has no numeric value");
    }

    let unit = sub
        .get(KEY_UNIT)
        .or_else(|| sub.get("unit"))
        .and_then(Value::as_str)
        .and_then(|code| {
            let unit = normalize_unit(code);
            if unit.is_none() {
                warn!(key, code, "unknown measurement unit");
            }
            unit
        });

    let status = sub
        .get(KEY_STATUS)
        .and_then(Value::as_str)
        .map(str::to_owned);

    Measurement {
        value: reading,
        unit,
        status,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    fn record(value: Value) -> RawDeviceRecord {
        match value {
            Value::Object(map) => RawDeviceRecord::new(map),
            _ => RawDeviceRecord::new(Map::new()),
        }
    }

    // ── Timestamps ───────────────────────────────────────────────────

    #[test]
    fn timestamp_with_nanoseconds_truncates() {
        let r = record(json!({ "last_seen": "2024-06-14T03:40:39.667544824Z" }));
        let ts = decode_timestamp(&r, "last_seen").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 6, 14));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (3, 40, 39));
        assert_eq!(ts.nanosecond(), 0);
    }

    #[test]
    fn timestamp_without_fraction() {
        let r = record(json!({ "last_test_time": "2024-06-22T16:00:19Z" }));
        let ts = decode_timestamp(&r, "last_test_time").unwrap();
        assert_eq!(ts.second(), 19);
        assert_eq!(ts.nanosecond(), 0);
        assert_eq!(ts.to_rfc3339(), "2024-06-22T16:00:19+00:00");
    }

    #[test]
    fn timestamp_with_millis() {
        assert_eq!(
            parse_vendor_timestamp("2024-01-02T03:04:05.123Z"),
            parse_vendor_timestamp("2024-01-02T03:04:05Z"),
        );
    }

    #[test]
    fn timestamp_garbage_is_unknown() {
        let r = record(json!({
            "last_seen": "not-a-date",
            "last_test_time": 1_718_336_439,
            "iaq_last_test_time": "",
        }));
        assert_eq!(decode_timestamp(&r, "last_seen"), None);
        assert_eq!(decode_timestamp(&r, "last_test_time"), None);
        assert_eq!(decode_timestamp(&r, "iaq_last_test_time"), None);
        assert_eq!(decode_timestamp(&r, "missing"), None);
    }

    // ── Measurements ─────────────────────────────────────────────────

    #[test]
    fn measurement_full_object() {
        let r = record(json!({
            "tvoc": { "value": 605.09, "status": "Moderate", "Unit": "ppb" }
        }));
        assert_eq!(
            decode_measurement(&r, "tvoc"),
            Measurement {
                value: Some(605.09),
                unit: Some(CanonicalUnit::PartsPerBillion),
                status: Some("Moderate".into()),
            }
        );
    }

    #[test]
    fn measurement_bare_number_is_all_none() {
        let r = record(json!({ "tvoc": 605.09 }));
        let m = decode_measurement(&r, "tvoc");
        assert_eq!(m, Measurement::default());
        assert!(m.is_unknown());
    }

    #[test]
    fn measurement_unknown_unit_keeps_value() {
        let r = record(json!({
            "iaq": { "value": 42, "status": "Good", "Unit": "aqi" }
        }));
        let m = decode_measurement(&r, "iaq");
        assert_eq!(m.value, Some(42.0));
        assert_eq!(m.unit, None);
        assert_eq!(m.status.as_deref(), Some("Good"));
    }

    #[test]
    fn measurement_missing_parts() {
        let r = record(json!({ "humidity": { "Unit": "%RH" } }));
        let m = decode_measurement(&r, "humidity");
        assert_eq!(m.value, None);
        assert_eq!(m.unit, Some(CanonicalUnit::RelativeHumidityPercent));
        assert_eq!(m.status, None);
    }

    // ── Scalars ──────────────────────────────────────────────────────

    #[test]
    fn scalars_pass_through() {
        let r = record(json!({
            "smoke_alarm": false,
            "ap_rssi": -61,
            "batt_volt": 2.98,
            "ssid": "home-net",
            "capabilities": ["smoke", "co"],
            "null_field": null,
        }));
        assert_eq!(decode_scalar(&r, "smoke_alarm"), Some(ScalarValue::Bool(false)));
        assert_eq!(decode_scalar(&r, "ap_rssi"), Some(ScalarValue::Integer(-61)));
        assert_eq!(decode_scalar(&r, "batt_volt"), Some(ScalarValue::Float(2.98)));
        assert_eq!(
            decode_scalar(&r, "ssid"),
            Some(ScalarValue::Text("home-net".into()))
        );
        assert!(matches!(
            decode_scalar(&r, "capabilities"),
            Some(ScalarValue::Structured(_))
        ));
        assert_eq!(decode_scalar(&r, "null_field"), None);
    }

    #[test]
    fn scalar_bool_readings() {
        assert_eq!(ScalarValue::Integer(0).as_bool(), Some(false));
        assert_eq!(ScalarValue::Text("TRUE".into()).as_bool(), Some(true));
        assert_eq!(ScalarValue::Text("ok".into()).as_bool(), None);
        assert_eq!(ScalarValue::Float(1.0).as_bool(), None);
    }

    // ── Properties ───────────────────────────────────────────────────

    #[test]
    fn absent_keys_are_unknown_for_every_decoder() {
        let r = record(json!({ "label": "Hall" }));
        for kind in [DecoderKind::Scalar, DecoderKind::Timestamp, DecoderKind::Measurement] {
            let field = decode(&r, "co2", kind);
            assert!(field.is_unknown(), "{kind} should be unknown");
            assert_eq!(field.kind(), kind);
        }
    }

    #[test]
    fn decoding_is_idempotent() {
        let r = record(json!({
            "last_seen": "2024-06-14T03:40:39.667544824Z",
            "tvoc": { "value": 605.09, "status": "Moderate", "Unit": "ppb" },
            "co2": 400,
            "ssid": "home-net",
        }));
        let before = r.clone();
        for key in ["last_seen", "tvoc", "co2", "ssid", "missing"] {
            for kind in [DecoderKind::Scalar, DecoderKind::Timestamp, DecoderKind::Measurement] {
                assert_eq!(decode(&r, key, kind), decode(&r, key, kind));
            }
        }
        assert_eq!(r, before);
    }

    #[test]
    fn decoded_field_serializes_tagged() {
        let field = DecodedField::Measurement(Measurement {
            value: Some(21.5),
            unit: Some(CanonicalUnit::Celsius),
            status: Some("Good".into()),
        });
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({
                "kind": "measurement",
                "value": { "value": 21.5, "unit": "Celsius", "status": "Good" }
            })
        );
    }
}
