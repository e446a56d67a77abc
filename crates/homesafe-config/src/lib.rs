//! Shared configuration for HomeSafe tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation into the transport and coordinator configs the core needs.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use homesafe_api::TransportConfig;
use homesafe_api::transport::DEFAULT_API_URL;
use homesafe_core::CoordinatorConfig;

/// Keyring service name; entries are keyed `"{profile}/password"`.
pub const KEYRING_SERVICE: &str = "homesafe";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is given on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Output format used when `-o` is not given.
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode used when `--color` is not given.
    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds between polls.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            update_interval: default_update_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_update_interval() -> u64 {
    60
}
fn default_timeout() -> u64 {
    30
}

/// One HomeSafe account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Account email used to log in.
    pub email: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Previously captured session cookies, name to value. Used instead of
    /// logging in when present.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cookies: BTreeMap<String, String>,

    /// Override poll cadence, seconds.
    pub update_interval: Option<u64>,

    /// Override HTTP timeout, seconds.
    pub timeout: Option<u64>,

    /// Override API root.
    pub api_url: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "homesafe", "homesafe").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("homesafe");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Environment overrides use `HOMESAFE_` and `__` as the nesting
/// separator, e.g. `HOMESAFE_DEFAULTS__UPDATE_INTERVAL=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOMESAFE_").ignore(&["password", "email", "config"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Account email from the profile or `HOMESAFE_EMAIL`.
pub fn resolve_email(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .email
        .clone()
        .or_else(|| std::env::var("HOMESAFE_EMAIL").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the account password.
///
/// Order: the env var named by `password_env`, `HOMESAFE_PASSWORD`, the
/// system keyring, then the plaintext config value.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(pw) = std::env::var("HOMESAFE_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build the HTTP transport config for a profile. The cookie jar is
/// always enabled; the session lives in it.
pub fn profile_to_transport_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<TransportConfig, ConfigError> {
    let raw = profile.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    let base_url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    let mut transport = TransportConfig::default()
        .with_base_url(base_url)
        .with_cookie_jar();
    transport.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(transport)
}

/// Build the coordinator config for a profile. `interval_override` wins
/// over the profile and the global default.
pub fn profile_to_coordinator_config(
    profile: &Profile,
    defaults: &Defaults,
    interval_override: Option<u64>,
) -> CoordinatorConfig {
    let secs = interval_override
        .or(profile.update_interval)
        .unwrap_or(defaults.update_interval);
    CoordinatorConfig::default().with_update_interval(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                email: Some("me@example.com".into()),
                password: Some("hunter2".into()),
                cookies: BTreeMap::from([("access_token".into(), "abc".into())]),
                update_interval: Some(120),
                ..Profile::default()
            },
        );
        cfg.default_profile = Some("home".into());
        cfg
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, toml::to_string_pretty(&sample()).unwrap()).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(loaded.defaults, Defaults::default());
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn output_and_color_defaults_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\noutput = \"json\"\ncolor = \"never\"\n").unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.output, "json");
        assert_eq!(loaded.defaults.color, "never");
        assert_eq!(loaded.defaults.update_interval, 60);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\nupdate_interval = 15\n\n[profiles.cabin]\nemail = \"a@b.c\"\n",
        )
        .unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.update_interval, 15);
        assert_eq!(loaded.defaults.timeout, 30);
        assert_eq!(loaded.profiles["cabin"].email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn profile_lookup_falls_back_to_default_profile() {
        let cfg = sample();
        assert_eq!(cfg.profile(None).unwrap().0, "home");
        assert!(matches!(
            cfg.profile(Some("nope")),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let profile = Profile {
            password: Some("hunter2".into()),
            password_env: Some("HOMESAFE_TEST_UNSET_PASSWORD_VAR".into()),
            ..Profile::default()
        };
        if std::env::var("HOMESAFE_PASSWORD").is_err() {
            let pw = resolve_password(&profile, "homesafe-test-profile-without-keyring").unwrap();
            assert_eq!(pw.expose_secret(), "hunter2");
        }
    }

    #[test]
    fn interval_precedence() {
        let defaults = Defaults::default();
        let profile = Profile {
            update_interval: Some(120),
            ..Profile::default()
        };

        let cfg = profile_to_coordinator_config(&profile, &defaults, None);
        assert_eq!(cfg.update_interval, Duration::from_secs(120));

        let cfg = profile_to_coordinator_config(&profile, &defaults, Some(5));
        assert_eq!(cfg.update_interval, Duration::from_secs(5));

        let cfg = profile_to_coordinator_config(&Profile::default(), &defaults, None);
        assert_eq!(cfg.update_interval, Duration::from_secs(60));
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn transport_config_uses_overrides() {
        let profile = Profile {
            api_url: Some("http://localhost:8080/api".into()),
            timeout: Some(5),
            ..Profile::default()
        };
        let transport = profile_to_transport_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(transport.base_url.as_str(), "http://localhost:8080/api/");
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert!(transport.cookie_jar.is_some());

        let bad = Profile {
            api_url: Some("not a url".into()),
            ..Profile::default()
        };
        assert!(profile_to_transport_config(&bad, &Defaults::default()).is_err());
    }
}
