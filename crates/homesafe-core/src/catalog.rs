// ── Observable catalog ──
//
// Static table of every field the integration knows how to expose, the
// decoder each one is read with, and the controls each hardware family
// accepts. Devices only get the observables whose field they report.

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use crate::command::CommandKind;
use crate::decode::{DecodedField, DecoderKind};
use crate::model::{Device, ModelClass};
use crate::units::CanonicalUnit;

/// How a binary observable reads its scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BinaryRule {
    /// On when the field is truthy.
    Truthy,
    /// On when the field is falsy (`offline` exposed as online).
    Inverse,
    /// On when the field is anything but `"ok"`.
    NotOk,
}

impl BinaryRule {
    pub fn apply(self, field: &DecodedField) -> Option<bool> {
        let DecodedField::Scalar(Some(value)) = field else {
            return None;
        };
        match self {
            Self::Truthy => value.as_bool(),
            Self::Inverse => value.as_bool().map(|on| !on),
            Self::NotOk => Some(value.to_string() != "ok"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rule", rename_all = "snake_case")]
pub enum ObservableKind {
    Binary(BinaryRule),
    Sensor,
    Measurement,
    Timestamp,
}

impl ObservableKind {
    pub fn decoder(self) -> DecoderKind {
        match self {
            Self::Binary(_) | Self::Sensor => DecoderKind::Scalar,
            Self::Measurement => DecoderKind::Measurement,
            Self::Timestamp => DecoderKind::Timestamp,
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: ObservableKind,
    /// Diagnostic observables are hidden from summary views.
    pub diagnostic: bool,
    /// Unit of a plain sensor whose payload carries none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<CanonicalUnit>,
}

use BinaryRule::{Inverse, NotOk, Truthy};
use CanonicalUnit::{Decibel, Fahrenheit, Hours, Volt, Weeks};
use ObservableKind::{Measurement, Sensor, Timestamp};

const fn binary(key: &'static str, name: &'static str, rule: BinaryRule) -> FieldSpec {
    FieldSpec {
        key,
        name,
        kind: ObservableKind::Binary(rule),
        diagnostic: false,
        unit: None,
    }
}

const fn field(key: &'static str, name: &'static str, kind: ObservableKind) -> FieldSpec {
    FieldSpec {
        key,
        name,
        kind,
        diagnostic: false,
        unit: None,
    }
}

const fn sensor(key: &'static str, name: &'static str, unit: CanonicalUnit) -> FieldSpec {
    FieldSpec {
        unit: Some(unit),
        ..field(key, name, Sensor)
    }
}

const fn diagnostic(spec: FieldSpec) -> FieldSpec {
    FieldSpec {
        diagnostic: true,
        ..spec
    }
}

pub const CATALOG: &[FieldSpec] = &[
    // Alarm and health states
    binary("smoke_alarm", "Smoke Alarm", Truthy),
    binary("smoke_hushed", "Smoke Hushed", Truthy),
    binary("co_alarm", "CO Alarm", Truthy),
    binary("hardwire_smoke", "Hardwire Smoke Alarm", Truthy),
    diagnostic(binary("too_much_smoke", "Too Much Smoke", Truthy)),
    binary("contact_lost", "Contact Lost", Truthy),
    binary("offline", "Online", Inverse),
    binary("battery_state", "Battery Problem", NotOk),
    // Timestamps
    field("last_seen", "Last Seen", Timestamp),
    field("last_test_time", "Last Test Time", Timestamp),
    field("iaq_last_test_time", "IAQ Last Test Time", Timestamp),
    // Plain sensors
    field("overall_iaq_status", "Overall Air Quality", Sensor),
    field("smoke_level", "Smoke Level", Sensor),
    field("co_level", "CO Level", Sensor),
    sensor("batt_volt", "Battery Voltage", Volt),
    sensor("life", "Weeks to Replace", Weeks),
    sensor("temperature", "Temperature", Fahrenheit),
    diagnostic(sensor("ap_rssi", "Signal Strength", Decibel)),
    diagnostic(field("ssid", "SSID", Sensor)),
    diagnostic(field("alarm_interval", "Alarm Interval", Sensor)),
    diagnostic(field("alarm_reset_time", "Alarm Reset Time", Sensor)),
    diagnostic(field("battery_level", "Battery Level", Sensor)),
    diagnostic(sensor("battery_voltage", "Battery Voltage", Volt)),
    diagnostic(field("checkin_interval", "Check-in Interval", Sensor)),
    diagnostic(sensor("hold_alarm_time", "Alarm Hold Time", Hours)),
    diagnostic(field(
        "rapid_temperature_variation_status",
        "Temperature Variation Status",
        Sensor,
    )),
    diagnostic(field("temperature_variation_value", "Temperature Variation", Sensor)),
    // Compound measurements
    field("iaq_temperature", "Indoor Temperature", Measurement),
    field("humidity", "Humidity", Measurement),
    field("hpa", "Air Pressure", Measurement),
    field("tvoc", "Total VOC", Measurement),
    field("iaq", "Indoor Air Quality", Measurement),
    field("co2", "CO\u{2082} Level", Measurement),
];

pub fn field_spec(key: &str) -> Option<&'static FieldSpec> {
    CATALOG.iter().find(|spec| spec.key == key)
}

/// Catalog entries this device reports a field for, in catalog order.
pub fn observables_for(device: &Device) -> impl Iterator<Item = &'static FieldSpec> + '_ {
    CATALOG.iter().filter(|spec| device.has_field(spec.key))
}

// ── Readings ──

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Binary(Option<bool>),
    Field(DecodedField),
}

impl ReadingValue {
    pub fn is_unknown(&self) -> bool {
        match self {
            Self::Binary(state) => state.is_none(),
            Self::Field(field) => field.is_unknown(),
        }
    }
}

/// The current value of one observable on one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Stable id: `"{label}_{key}"`.
    pub unique_id: String,
    pub key: &'static str,
    pub name: &'static str,
    pub diagnostic: bool,
    pub value: ReadingValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<CanonicalUnit>,
}

pub fn unique_id(device: &Device, key: &str) -> String {
    format!("{}_{key}", device.label())
}

pub fn read(device: &Device, spec: &'static FieldSpec) -> Reading {
    let field = device.get_field(spec.key, spec.kind.decoder());
    let value = match spec.kind {
        ObservableKind::Binary(rule) => ReadingValue::Binary(rule.apply(&field)),
        _ => ReadingValue::Field(field),
    };
    Reading {
        unique_id: unique_id(device, spec.key),
        key: spec.key,
        name: spec.name,
        diagnostic: spec.diagnostic,
        value,
        unit: spec.unit,
    }
}

/// Every capability-gated reading for a device.
pub fn readings(device: &Device) -> Vec<Reading> {
    observables_for(device).map(|spec| read(device, spec)).collect()
}

// ── Controls ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    /// Fire-once action.
    Button,
    /// On/off toggle whose current state lives in `state_key`.
    Switch { state_key: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: ControlKind,
    /// Commands behind this control; a switch sends the first to turn on
    /// and the second to turn off.
    pub commands: &'static [CommandKind],
}

const TEST: ControlSpec = ControlSpec {
    key: "test",
    name: "Test",
    kind: ControlKind::Button,
    commands: &[CommandKind::Test],
};

const HUSH: ControlSpec = ControlSpec {
    key: "hush",
    name: "Hush",
    kind: ControlKind::Button,
    commands: &[CommandKind::Hush],
};

const IDENTIFY: ControlSpec = ControlSpec {
    key: "identifying",
    name: "Identifying",
    kind: ControlKind::Switch {
        state_key: "identifying",
    },
    commands: &[CommandKind::Identify, CommandKind::IdentifyCancel],
};

pub fn controls_for(class: ModelClass) -> &'static [ControlSpec] {
    match class {
        ModelClass::IaqSmokeDetector => &[TEST, HUSH, IDENTIFY],
        ModelClass::SmokeDetector => &[TEST, HUSH],
        ModelClass::CoDetector | ModelClass::WaterLeakDetector | ModelClass::Unrecognized => &[],
    }
}

/// Commands a hardware family accepts.
pub fn commands_for(class: ModelClass) -> Vec<CommandKind> {
    controls_for(class)
        .iter()
        .flat_map(|control| control.commands.iter().copied())
        .collect()
}

pub fn accepts(class: ModelClass, command: CommandKind) -> bool {
    controls_for(class)
        .iter()
        .any(|control| control.commands.contains(&command))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decode::ScalarValue;
    use crate::model::{RawDeviceRecord, VendorId};
    use pretty_assertions::assert_eq;
    use serde_json::{Map, Value, json};
    use std::collections::HashSet;

    fn device(fields: Value) -> Device {
        let Value::Object(map) = fields else {
            panic!("fixture must be an object")
        };
        Device::new(VendorId::Numeric(7), RawDeviceRecord::from(map))
    }

    #[test]
    fn catalog_keys_are_unique() {
        let keys: HashSet<_> = CATALOG.iter().map(|spec| spec.key).collect();
        assert_eq!(keys.len(), CATALOG.len());
    }

    #[test]
    fn observables_are_capability_gated() {
        let water = device(json!({
            "label": "Basement",
            "model": "waterleakdetector",
            "temperature": 12.5,
            "offline": false,
            "last_seen": "2024-06-22T16:00:19Z",
        }));
        let keys: Vec<_> = observables_for(&water).map(|spec| spec.key).collect();
        assert_eq!(keys, vec!["offline", "last_seen", "temperature"]);
        assert!(observables_for(&device(Value::Object(Map::new()))).next().is_none());
    }

    #[test]
    fn binary_rules() {
        let d = device(json!({
            "label": "Hall",
            "smoke_alarm": true,
            "offline": false,
            "battery_state": "low",
        }));
        let state = |key| read(&d, field_spec(key).unwrap()).value;
        assert_eq!(state("smoke_alarm"), ReadingValue::Binary(Some(true)));
        assert_eq!(state("offline"), ReadingValue::Binary(Some(true)));
        assert_eq!(state("battery_state"), ReadingValue::Binary(Some(true)));

        let ok = device(json!({ "battery_state": "ok", "offline": null }));
        let state = |key| read(&ok, field_spec(key).unwrap()).value;
        assert_eq!(state("battery_state"), ReadingValue::Binary(Some(false)));
        assert_eq!(state("offline"), ReadingValue::Binary(None));
    }

    #[test]
    fn unique_id_is_label_and_key() {
        let d = device(json!({ "label": "Kitchen", "co2": { "value": 612, "Unit": "PPM" } }));
        let readings = readings(&d);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].unique_id, "Kitchen_co2");
        assert!(!readings[0].value.is_unknown());
    }

    #[test]
    fn plain_sensors_carry_fixed_units() {
        let units = [
            ("batt_volt", Volt),
            ("battery_voltage", Volt),
            ("life", Weeks),
            ("ap_rssi", Decibel),
            ("hold_alarm_time", Hours),
            ("temperature", Fahrenheit),
        ];
        for (key, unit) in units {
            assert_eq!(field_spec(key).unwrap().unit, Some(unit), "{key}");
        }
        assert_eq!(field_spec("ssid").unwrap().unit, None);
        assert_eq!(field_spec("co2").unwrap().unit, None);

        let d = device(json!({ "label": "Basement", "temperature": 72 }));
        let reading = read(&d, field_spec("temperature").unwrap());
        assert_eq!(reading.unit, Some(Fahrenheit));
        assert_eq!(reading.value, ReadingValue::Field(DecodedField::Scalar(Some(ScalarValue::Integer(72)))));
    }

    #[test]
    fn diagnostic_flags() {
        assert!(field_spec("ap_rssi").unwrap().diagnostic);
        assert!(field_spec("too_much_smoke").unwrap().diagnostic);
        assert!(!field_spec("smoke_alarm").unwrap().diagnostic);
    }

    #[test]
    fn command_gating_by_model_class() {
        assert_eq!(
            commands_for(ModelClass::IaqSmokeDetector),
            vec![
                CommandKind::Test,
                CommandKind::Hush,
                CommandKind::Identify,
                CommandKind::IdentifyCancel
            ]
        );
        assert!(accepts(ModelClass::SmokeDetector, CommandKind::Hush));
        assert!(!accepts(ModelClass::SmokeDetector, CommandKind::Identify));
        assert!(!accepts(ModelClass::CoDetector, CommandKind::Test));
        assert!(commands_for(ModelClass::Unrecognized).is_empty());
    }
}
