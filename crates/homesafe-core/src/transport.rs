// ── Transport seam ──
//
// The coordinator only needs two things from the cloud session: the raw
// fleet and a way to send commands. `HomesafeClient` is the production
// implementation; tests substitute in-memory ones.

use std::future::Future;

use homesafe_api::HomesafeClient;
use tracing::debug;

use crate::command::CommandKind;
use crate::model::VendorId;
use crate::snapshot::{RawFleet, raw_fleet_from_devices};

/// Session-holding client for the vendor cloud.
pub trait FleetTransport: Send + Sync + 'static {
    /// Fetch every device record visible to the session.
    fn fetch_fleet(&self) -> impl Future<Output = Result<RawFleet, homesafe_api::Error>> + Send;

    /// Send one command to one device.
    fn send_command(
        &self,
        location_id: &VendorId,
        device_id: &VendorId,
        command: CommandKind,
    ) -> impl Future<Output = Result<(), homesafe_api::Error>> + Send;
}

impl FleetTransport for HomesafeClient {
    async fn fetch_fleet(&self) -> Result<RawFleet, homesafe_api::Error> {
        let data = self.get_data().await?;
        debug!(
            locations = data.locations.len(),
            devices = data.devices.len(),
            "fetched fleet"
        );
        Ok(raw_fleet_from_devices(data.devices))
    }

    async fn send_command(
        &self,
        location_id: &VendorId,
        device_id: &VendorId,
        command: CommandKind,
    ) -> Result<(), homesafe_api::Error> {
        self.device_command(
            &location_id.to_string(),
            &device_id.to_string(),
            command.into(),
        )
        .await
    }
}
