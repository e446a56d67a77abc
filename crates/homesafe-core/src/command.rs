// ── Command dispatch ──
//
// Remote commands are best-effort request/response. A successful send
// says only that the cloud accepted the request; the resulting device
// state shows up in a later poll, never in the cached snapshot directly.

use std::sync::Arc;

use serde::Serialize;
use strum::{Display, EnumString, IntoStaticStr};
use tracing::{debug, info};

use homesafe_api::DeviceCommand;

use crate::error::CoreError;
use crate::model::DeviceIdentity;
use crate::transport::FleetTransport;

/// The closed set of remote commands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    /// Start the alarm self-test.
    Test,
    /// Silence a sounding alarm.
    Hush,
    /// Flash/beep so the unit can be located.
    Identify,
    IdentifyCancel,
}

impl From<CommandKind> for DeviceCommand {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Test => DeviceCommand::Test,
            CommandKind::Hush => DeviceCommand::Hush,
            CommandKind::Identify => DeviceCommand::Identify,
            CommandKind::IdentifyCancel => DeviceCommand::IdentifyCancel,
        }
    }
}

/// Sends commands for a device through the transport.
///
/// Model gating is the caller's job (see [`crate::catalog::accepts`]);
/// failures are returned as-is and never retried.
pub struct CommandDispatcher<T: FleetTransport> {
    transport: Arc<T>,
}

impl<T: FleetTransport> Clone for CommandDispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: FleetTransport> CommandDispatcher<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub async fn send(&self, device: &DeviceIdentity, command: CommandKind) -> Result<(), CoreError> {
        let location_id = device
            .location_id
            .as_ref()
            .ok_or_else(|| CoreError::MissingField {
                device: device.label.clone(),
                field: "location_id".into(),
            })?;

        debug!(device = %device.label, id = %device.id, %command, "dispatching command");
        self.transport
            .send_command(location_id, &device.id, command)
            .await?;
        info!(device = %device.label, %command, "command accepted");
        Ok(())
    }
}
