//! Config subcommand handlers.

use homesafe_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

/// Copy of the config with passwords and cookie values masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
        for value in profile.cookies.values_mut() {
            *value = REDACTED.into();
        }
    }
    cfg
}

pub fn handle(args: &ConfigArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Show => {
            let cfg = redacted(cfg);
            let out = match global.output {
                OutputFormat::Json => output::render_json(&cfg, false),
                OutputFormat::JsonCompact => output::render_json(&cfg, true),
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homesafe_config::Profile;

    #[test]
    fn secrets_are_masked() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                password: Some("hunter2".into()),
                cookies: [("session".to_owned(), "abc".to_owned())].into(),
                ..Profile::default()
            },
        );

        let masked = redacted(&cfg);
        let profile = &masked.profiles["home"];
        assert_eq!(profile.password.as_deref(), Some(REDACTED));
        assert_eq!(profile.cookies["session"], REDACTED);
        assert_eq!(cfg.profiles["home"].password.as_deref(), Some("hunter2"));
    }
}
