//! Command handlers, one module per command family.

pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod show;
pub mod watch;

mod util;

use homesafe_config::Config;
use homesafe_core::CommandKind;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::session::FleetCoordinator;

/// Route a parsed command to its handler.
pub async fn dispatch(
    cmd: Command,
    coordinator: &FleetCoordinator,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices => devices::handle(coordinator, global).await,
        Command::Show(arg) => show::handle(coordinator, &arg.device, global).await,
        Command::Watch => watch::handle(coordinator, global).await,
        Command::Test(arg) => control::handle(coordinator, &arg.device, CommandKind::Test, global).await,
        Command::Hush(arg) => control::handle(coordinator, &arg.device, CommandKind::Hush, global).await,
        Command::Identify(arg) => {
            control::handle(coordinator, &arg.device, CommandKind::Identify, global).await
        }
        Command::IdentifyCancel(arg) => {
            control::handle(coordinator, &arg.device, CommandKind::IdentifyCancel, global).await
        }
        Command::Config(args) => config_cmd::handle(&args, cfg, global),
    }
}
