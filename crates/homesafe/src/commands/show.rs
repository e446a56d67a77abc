//! `homesafe show <device>`: every reading a device reports.

use chrono::Local;
use serde::Serialize;
use tabled::Tabled;

use homesafe_core::catalog::{self, ControlSpec, Reading, ReadingValue};
use homesafe_core::{DecodedField, Device, DeviceIdentity, ModelClassDescription};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;
use crate::session::FleetCoordinator;

use super::util;

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Reading")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Key")]
    key: String,
}

#[derive(Serialize)]
struct DeviceDetail {
    identity: DeviceIdentity,
    model_class: ModelClassDescription,
    readings: Vec<Reading>,
    controls: &'static [ControlSpec],
}

impl From<&Device> for DeviceDetail {
    fn from(device: &Device) -> Self {
        let model_class = device.model_class();
        Self {
            identity: device.identity(),
            readings: catalog::readings(device),
            controls: catalog::controls_for(model_class.class),
            model_class,
        }
    }
}

/// Human rendering of one reading's value, with its unit.
pub fn format_value(reading: &Reading, color: bool) -> String {
    match &reading.value {
        ReadingValue::Binary(state) => output::paint_alarm(*state, color),
        ReadingValue::Field(DecodedField::Scalar(v)) => match (v, reading.unit) {
            (Some(v), Some(unit)) => format!("{v} {unit}"),
            (Some(v), None) => v.to_string(),
            (None, _) => "-".into(),
        },
        ReadingValue::Field(DecodedField::Timestamp(ts)) => ts.map_or_else(
            || "-".into(),
            |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        ),
        ReadingValue::Field(DecodedField::Measurement(m)) => {
            let mut text = m.value.map_or_else(|| "-".into(), |v| v.to_string());
            if let Some(unit) = m.unit {
                text.push(' ');
                text.push_str(<&str>::from(unit));
            }
            if let Some(ref status) = m.status {
                text.push_str(&format!(" ({status})"));
            }
            text
        }
    }
}

fn detail(d: &DeviceDetail, color: bool) -> String {
    let lines = [
        format!("ID:        {}", d.identity.id),
        format!("Label:     {}", d.identity.label),
        format!("Model:     {}", d.model_class.label),
        format!("Hardware:  {}", d.identity.hwrev.as_deref().unwrap_or("-")),
        format!("Firmware:  {}", d.identity.fwrev.as_deref().unwrap_or("-")),
        format!("Serial:    {}", d.identity.serial_number.as_deref().unwrap_or("-")),
        format!(
            "Location:  {}",
            d.identity
                .location_id
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string)
        ),
    ];

    let rows: Vec<ReadingRow> = d
        .readings
        .iter()
        .map(|r| ReadingRow {
            name: if r.diagnostic {
                format!("{} (diagnostic)", r.name)
            } else {
                r.name.into()
            },
            value: format_value(r, color),
            key: r.key.into(),
        })
        .collect();

    let mut out = lines.join("\n");
    if !rows.is_empty() {
        out.push_str("\n\n");
        out.push_str(&output::render_table(&rows));
    }
    out
}

pub async fn handle(
    coordinator: &FleetCoordinator,
    query: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = util::fetch(coordinator).await?;
    let device = util::resolve(&snapshot, query)?;
    let color = output::should_color(global.color);

    let out = output::render_single(
        global.output,
        &DeviceDetail::from(device),
        |d| detail(d, color),
        |d| {
            d.readings
                .iter()
                .map(|r| format!("{}={}", r.key, format_value(r, false)))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
