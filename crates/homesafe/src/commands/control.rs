//! `homesafe test|hush|identify|identify-cancel <device>`.

use homesafe_core::CommandKind;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::session::FleetCoordinator;

use super::util;

pub async fn handle(
    coordinator: &FleetCoordinator,
    query: &str,
    command: CommandKind,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = util::fetch(coordinator).await?;
    let device = util::resolve(&snapshot, query)?;

    coordinator.execute(&device.id, command).await?;

    if !global.quiet {
        eprintln!(
            "{command} accepted for {}; the device state updates on the next poll",
            device.label()
        );
    }
    Ok(())
}
