// Wire types for the HomeSafe cloud.
//
// Device payloads are deliberately left as raw JSON objects: their shape
// varies across models and firmware, and normalization happens in
// `homesafe-core`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

/// A location (home) grouping devices under one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
}

/// Everything fetched in one `get_data` call.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub locations: Vec<Location>,
    /// Raw device objects in vendor order, across all locations.
    pub devices: Vec<Map<String, Value>>,
}

/// Remote commands accepted by the device command endpoint.
///
/// The `Display` form is the wire name used in the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum DeviceCommand {
    #[strum(serialize = "InitiateSelfTest")]
    Test,
    #[strum(serialize = "Hush")]
    Hush,
    #[strum(serialize = "IdentifyDevice")]
    Identify,
    #[strum(serialize = "IdentifyDeviceCancel")]
    IdentifyCancel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn command_wire_names() {
        assert_eq!(DeviceCommand::Test.to_string(), "InitiateSelfTest");
        assert_eq!(DeviceCommand::IdentifyCancel.to_string(), "IdentifyDeviceCancel");
        assert_eq!(
            DeviceCommand::from_str("Hush").ok(),
            Some(DeviceCommand::Hush)
        );
    }

    #[test]
    fn location_tolerates_missing_name() {
        let loc: Location = serde_json::from_str(r#"{"id": 42}"#).expect("valid location");
        assert_eq!(loc.id, Value::from(42));
        assert!(loc.name.is_none());
    }
}
