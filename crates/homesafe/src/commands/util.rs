//! Shared helpers for command handlers.

use std::sync::Arc;

use homesafe_core::{Device, FleetSnapshot};

use crate::error::CliError;
use crate::session::FleetCoordinator;

/// One refresh, for commands that read the fleet once.
pub async fn fetch(coordinator: &FleetCoordinator) -> Result<Arc<FleetSnapshot>, CliError> {
    Ok(coordinator.refresh().await?)
}

/// Find a device by id or label.
pub fn resolve<'a>(snapshot: &'a FleetSnapshot, query: &str) -> Result<&'a Device, CliError> {
    snapshot.find(query).ok_or_else(|| CliError::DeviceNotFound {
        identifier: query.into(),
    })
}
