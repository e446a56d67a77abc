//! Clap derive structures for the `homesafe` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};
use homesafe_config::Defaults;

use crate::error::CliError;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homesafe -- poll and control HomeSafe detectors
#[derive(Debug, Parser)]
#[command(
    name = "homesafe",
    version,
    about = "Monitor HomeSafe smoke, CO, and water-leak detectors from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "HOMESAFE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format [default: `defaults.output` from the config, else table]
    #[arg(
        id = "output",
        long = "output",
        short = 'o',
        value_name = "FORMAT",
        env = "HOMESAFE_OUTPUT",
        global = true
    )]
    output_arg: Option<OutputFormat>,

    /// Output format after config defaults are applied.
    #[arg(skip)]
    pub output: OutputFormat,

    /// When to use color output [default: `defaults.color` from the config, else auto]
    #[arg(id = "color", long = "color", value_name = "WHEN", global = true)]
    color_arg: Option<ColorMode>,

    #[arg(skip)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Poll interval in seconds (overrides profile; 0 disables polling)
    #[arg(long, env = "HOMESAFE_INTERVAL", global = true)]
    pub interval: Option<u64>,
}

impl GlobalOpts {
    /// Settle output format and color mode. Flags and env vars win; the
    /// config file's `[defaults]` fill in the rest.
    pub fn apply_defaults(&mut self, defaults: &Defaults) -> Result<(), CliError> {
        self.output = match self.output_arg {
            Some(format) => format,
            None => parse_default("defaults.output", &defaults.output)?,
        };
        self.color = match self.color_arg {
            Some(mode) => mode,
            None => parse_default("defaults.color", &defaults.color)?,
        };
        Ok(())
    }
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List detectors on the account
    #[command(alias = "ls", alias = "d")]
    Devices,

    /// Show every reading a detector reports
    Show(DeviceArg),

    /// Poll continuously and print a summary per refresh (Ctrl-C to stop)
    Watch,

    /// Start a detector's alarm self-test
    Test(DeviceArg),

    /// Silence a sounding alarm
    Hush(DeviceArg),

    /// Make a detector flash so it can be located
    Identify(DeviceArg),

    /// Stop identifying a detector
    IdentifyCancel(DeviceArg),

    /// Inspect CLI configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct DeviceArg {
    /// Device id or label (case-insensitive)
    pub device: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Print the resolved configuration (secrets redacted)
    Show,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn json_defaults() -> Defaults {
        Defaults {
            output: "JSON".into(),
            color: "never".into(),
            ..Defaults::default()
        }
    }

    #[test]
    fn config_defaults_fill_unset_flags() {
        let mut cli = Cli::try_parse_from(["homesafe", "devices"]).unwrap();
        cli.global.apply_defaults(&json_defaults()).unwrap();
        assert_eq!(cli.global.output, OutputFormat::Json);
        assert_eq!(cli.global.color, ColorMode::Never);
    }

    #[test]
    fn flags_override_config_defaults() {
        let mut cli =
            Cli::try_parse_from(["homesafe", "devices", "-o", "plain", "--color", "always"]).unwrap();
        cli.global.apply_defaults(&json_defaults()).unwrap();
        assert_eq!(cli.global.output, OutputFormat::Plain);
        assert_eq!(cli.global.color, ColorMode::Always);
    }

    #[test]
    fn unknown_default_is_rejected() {
        let mut cli = Cli::try_parse_from(["homesafe", "devices"]).unwrap();
        let defaults = Defaults {
            output: "yaml".into(),
            ..Defaults::default()
        };
        assert!(matches!(
            cli.global.apply_defaults(&defaults),
            Err(CliError::Validation { .. })
        ));
    }
}
