//! `homesafe devices`: list the fleet.

use serde::Serialize;
use tabled::Tabled;

use homesafe_core::catalog;
use homesafe_core::{CommandKind, Device, DeviceIdentity, ModelClassDescription};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;
use crate::session::FleetCoordinator;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Firmware")]
    fwrev: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Commands")]
    commands: String,
}

/// Serialized form of one listed device.
#[derive(Serialize)]
struct DeviceSummary {
    #[serde(flatten)]
    identity: DeviceIdentity,
    model_class: ModelClassDescription,
    commands: Vec<CommandKind>,
}

impl From<&Device> for DeviceSummary {
    fn from(device: &Device) -> Self {
        let model_class = device.model_class();
        Self {
            identity: device.identity(),
            commands: catalog::commands_for(model_class.class),
            model_class,
        }
    }
}

impl From<&DeviceSummary> for DeviceRow {
    fn from(d: &DeviceSummary) -> Self {
        let commands = d
            .commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: d.identity.id.to_string(),
            label: d.identity.label.clone(),
            model: d.model_class.label.clone(),
            fwrev: d.identity.fwrev.clone().unwrap_or_else(|| "-".into()),
            serial: d.identity.serial_number.clone().unwrap_or_else(|| "-".into()),
            commands: if commands.is_empty() { "-".into() } else { commands },
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(coordinator: &FleetCoordinator, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::fetch(coordinator).await?;
    let summaries: Vec<DeviceSummary> = snapshot.devices().values().map(DeviceSummary::from).collect();

    let out = output::render_list(
        global.output,
        &summaries,
        |d| DeviceRow::from(d),
        |d| d.identity.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
