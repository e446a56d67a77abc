mod cli;
mod commands;
mod error;
mod output;
mod session;

use clap::Parser;
use homesafe_config::Config;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConfigArgs, ConfigCommand};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let cfg = match &cli.command {
        // `config path` must work even when the file does not parse
        Command::Config(ConfigArgs {
            command: ConfigCommand::Path,
        }) => Config::default(),
        _ => homesafe_config::load_config()?,
    };
    cli.global.apply_defaults(&cfg.defaults)?;

    match cli.command {
        // Config commands don't need a session
        Command::Config(args) => commands::config_cmd::handle(&args, &cfg, &cli.global),

        cmd => {
            let coordinator = session::connect(&cli.global, &cfg).await?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &coordinator, &cfg, &cli.global).await
        }
    }
}
