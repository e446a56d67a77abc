// ── Unit normalization ──
//
// Measurement sub-objects carry a free-form `Unit` code. The table below
// is the complete set of codes the vendor is known to send.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use tracing::debug;

/// Canonical unit of a measurement. `Display` yields the unit symbol.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
pub enum CanonicalUnit {
    #[strum(serialize = "°C")]
    Celsius,
    #[strum(serialize = "°F")]
    Fahrenheit,
    #[strum(serialize = "%")]
    RelativeHumidityPercent,
    #[strum(serialize = "hPa")]
    Hectopascal,
    #[strum(serialize = "ppb")]
    PartsPerBillion,
    #[strum(serialize = "ppm")]
    PartsPerMillion,
    #[strum(serialize = "V")]
    Volt,
    // Fixed units of plain sensor fields; never sent as codes.
    #[strum(serialize = "dB")]
    Decibel,
    #[strum(serialize = "h")]
    Hours,
    #[strum(serialize = "weeks")]
    Weeks,
}

const UNIT_TABLE: &[(&str, CanonicalUnit)] = &[
    ("C", CanonicalUnit::Celsius),
    ("F", CanonicalUnit::Fahrenheit),
    ("%RH", CanonicalUnit::RelativeHumidityPercent),
    ("HPA", CanonicalUnit::Hectopascal),
    ("PPB", CanonicalUnit::PartsPerBillion),
    ("PPM", CanonicalUnit::PartsPerMillion),
    ("V", CanonicalUnit::Volt),
];

/// Map a vendor unit code to a canonical unit, ignoring ASCII case.
///
/// Unknown codes (including the empty string) return `None` and are
/// logged at debug level.
pub fn normalize_unit(code: &str) -> Option<CanonicalUnit> {
    let found = UNIT_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|&(_, unit)| unit);

    if found.is_none() {
        debug!(code, "unknown unit code");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_codes_in_any_case() {
        let cases = [
            ("C", CanonicalUnit::Celsius),
            ("c", CanonicalUnit::Celsius),
            ("F", CanonicalUnit::Fahrenheit),
            ("%RH", CanonicalUnit::RelativeHumidityPercent),
            ("%rh", CanonicalUnit::RelativeHumidityPercent),
            ("Hpa", CanonicalUnit::Hectopascal),
            ("hPa", CanonicalUnit::Hectopascal),
            ("ppb", CanonicalUnit::PartsPerBillion),
            ("PPM", CanonicalUnit::PartsPerMillion),
            ("v", CanonicalUnit::Volt),
        ];
        for (code, expected) in cases {
            assert_eq!(normalize_unit(code), Some(expected), "code {code:?}");
        }
    }

    #[test]
    fn unknown_codes_miss() {
        assert_eq!(normalize_unit("xyz"), None);
        assert_eq!(normalize_unit("dB"), None);
        assert_eq!(normalize_unit(""), None);
        assert_eq!(normalize_unit("µg/m3"), None);
        assert_eq!(normalize_unit(" C"), None);
    }

    #[test]
    fn symbols() {
        assert_eq!(CanonicalUnit::Hectopascal.to_string(), "hPa");
        assert_eq!(CanonicalUnit::RelativeHumidityPercent.to_string(), "%");
    }
}
