// ── Device domain types ──

use serde::Serialize;
use serde_json::Value;
use strum::{Display, IntoStaticStr};
use tracing::{debug, warn};

use super::record::RawDeviceRecord;
use super::vendor_id::VendorId;
use crate::decode::{DecodedField, DecoderKind, decode};

const KEY_LABEL: &str = "label";
const KEY_MODEL: &str = "model";
const KEY_HWREV: &str = "hwrev";
const KEY_FWREV: &str = "fwrev";
const KEY_SERIAL: &str = "serial_number";
const KEY_LOCATION: &str = "location_id";

/// Known hardware families, keyed by the vendor's `model` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModelClass {
    IaqSmokeDetector,
    SmokeDetector,
    CoDetector,
    WaterLeakDetector,
    Unrecognized,
}

const MODEL_TABLE: &[(&str, ModelClass, &str)] = &[
    ("wifiiaqdetector", ModelClass::IaqSmokeDetector, "Smoke Detector with IAQ"),
    ("wifidetector", ModelClass::SmokeDetector, "Smoke Detector"),
    ("cowifidetector", ModelClass::CoDetector, "Carbon Monoxide Detector"),
    ("waterleakdetector", ModelClass::WaterLeakDetector, "Water Leak + Freeze Detector"),
];

/// Friendly description of a device's hardware family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelClassDescription {
    pub class: ModelClass,
    /// The vendor's model string, or empty if none was reported.
    pub raw_model: String,
    /// Human label, e.g. `"Smoke Detector (wifidetector)"`. Unrecognized
    /// models fall back to the raw string.
    pub label: String,
}

impl ModelClassDescription {
    /// Table lookup with an explicit default arm for new hardware.
    pub fn from_model(raw_model: Option<&str>) -> Self {
        let raw = raw_model.unwrap_or_default();
        match MODEL_TABLE.iter().find(|(model, _, _)| *model == raw) {
            Some(&(_, class, friendly)) => Self {
                class,
                raw_model: raw.to_owned(),
                label: format!("{friendly} ({raw})"),
            },
            None => {
                debug!(model = raw, "unverified device model, labeling as-is");
                Self {
                    class: ModelClass::Unrecognized,
                    raw_model: raw.to_owned(),
                    label: raw.to_owned(),
                }
            }
        }
    }
}

/// Identity and hardware details derived from a device record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub id: VendorId,
    /// Human-readable name, also the anchor for unique ids.
    pub label: String,
    pub model: Option<String>,
    pub hwrev: Option<String>,
    pub fwrev: Option<String>,
    pub serial_number: Option<String>,
    pub location_id: Option<VendorId>,
}

/// Typed view over one device's raw record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub id: VendorId,
    pub record: RawDeviceRecord,
}

impl Device {
    pub fn new(id: VendorId, record: RawDeviceRecord) -> Self {
        Self { id, record }
    }

    pub fn identity(&self) -> DeviceIdentity {
        let label = self.record.get(KEY_LABEL).map_or_else(
            || {
                warn!(id = %self.id, "device record has no label, using id");
                self.id.to_string()
            },
            render_text,
        );

        DeviceIdentity {
            id: self.id.clone(),
            label,
            model: self.text_field(KEY_MODEL),
            hwrev: self.text_field(KEY_HWREV),
            fwrev: self.text_field(KEY_FWREV),
            serial_number: self.text_field(KEY_SERIAL),
            location_id: self.record.get(KEY_LOCATION).and_then(VendorId::from_json),
        }
    }

    /// The device's label, without the full identity computation.
    pub fn label(&self) -> String {
        self.record
            .get(KEY_LABEL)
            .map_or_else(|| self.id.to_string(), render_text)
    }

    pub fn model(&self) -> Option<&str> {
        self.record.get_str(KEY_MODEL)
    }

    pub fn model_class(&self) -> ModelClassDescription {
        ModelClassDescription::from_model(self.model())
    }

    /// Whether the device reports `key` at all. Observables for fields a
    /// device does not report are never created.
    pub fn has_field(&self, key: &str) -> bool {
        self.record.contains(key)
    }

    pub fn get_field(&self, key: &str, kind: DecoderKind) -> DecodedField {
        decode(&self.record, key, kind)
    }

    fn text_field(&self, key: &str) -> Option<String> {
        self.record.get(key).map(render_text)
    }
}

/// Text form of an identity field; firmware revisions are sometimes numbers.
fn render_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decode::ScalarValue;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    fn device(value: Value) -> Device {
        let Value::Object(map) = value else {
            return Device::new(VendorId::Numeric(0), RawDeviceRecord::new(Map::new()));
        };
        let id = map.get("id").and_then(VendorId::from_json).unwrap();
        Device::new(id, RawDeviceRecord::new(map))
    }

    #[test]
    fn identity_from_record() {
        let d = device(json!({
            "id": 1234,
            "label": "Hallway",
            "model": "wifiiaqdetector",
            "hwrev": "B",
            "fwrev": 32,
            "serial_number": "SN-9",
            "location_id": 77,
        }));

        assert_eq!(
            d.identity(),
            DeviceIdentity {
                id: VendorId::Numeric(1234),
                label: "Hallway".into(),
                model: Some("wifiiaqdetector".into()),
                hwrev: Some("B".into()),
                fwrev: Some("32".into()),
                serial_number: Some("SN-9".into()),
                location_id: Some(VendorId::Numeric(77)),
            }
        );
    }

    #[test]
    fn missing_label_falls_back_to_id() {
        let d = device(json!({ "id": 5 }));
        assert_eq!(d.identity().label, "5");
        assert_eq!(d.label(), "5");
        assert_eq!(d.identity().location_id, None);
    }

    #[test]
    fn known_model_classes() {
        let cases = [
            ("wifiiaqdetector", ModelClass::IaqSmokeDetector, "Smoke Detector with IAQ (wifiiaqdetector)"),
            ("wifidetector", ModelClass::SmokeDetector, "Smoke Detector (wifidetector)"),
            ("cowifidetector", ModelClass::CoDetector, "Carbon Monoxide Detector (cowifidetector)"),
            ("waterleakdetector", ModelClass::WaterLeakDetector, "Water Leak + Freeze Detector (waterleakdetector)"),
        ];
        for (model, class, label) in cases {
            let d = device(json!({ "id": 1, "model": model }));
            let desc = d.model_class();
            assert_eq!(desc.class, class);
            assert_eq!(desc.label, label);
            assert_eq!(desc.raw_model, model);
        }
    }

    #[test]
    fn unknown_model_passes_through() {
        let d = device(json!({ "id": 1, "model": "wifirelay9000", "smoke_alarm": true }));
        let desc = d.model_class();
        assert_eq!(desc.class, ModelClass::Unrecognized);
        assert_eq!(desc.label, "wifirelay9000");
        // Decoding still works for unrecognized hardware.
        assert_eq!(
            d.get_field("smoke_alarm", DecoderKind::Scalar),
            DecodedField::Scalar(Some(ScalarValue::Bool(true)))
        );
    }

    #[test]
    fn missing_model_is_unrecognized() {
        let d = device(json!({ "id": 1 }));
        let desc = d.model_class();
        assert_eq!(desc.class, ModelClass::Unrecognized);
        assert_eq!(desc.label, "");
    }

    #[test]
    fn has_field_gates_on_presence() {
        let d = device(json!({ "id": 1, "water_leak": false, "ssid": null }));
        assert!(d.has_field("water_leak"));
        assert!(d.has_field("ssid"));
        assert!(!d.has_field("smoke_alarm"));
    }
}
