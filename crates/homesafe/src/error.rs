//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use homesafe_config::ConfigError;
use homesafe_core::{CoreError, FailureKind, RefreshError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the HomeSafe cloud: {reason}")]
    #[diagnostic(
        code(homesafe::connection_failed),
        help("Check network connectivity, or the api_url override in your profile.")
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(homesafe::auth_failed),
        help(
            "Verify the email and password for profile '{profile}'.\n\
             Captured session cookies expire; remove them from the profile to log in again."
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(homesafe::no_credentials),
        help(
            "Set email and password_env in the profile, or export\n\
             HOMESAFE_EMAIL and HOMESAFE_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Devices ──────────────────────────────────────────────────────
    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(homesafe::not_found),
        help("Run: homesafe devices to see available detectors")
    )]
    DeviceNotFound { identifier: String },

    #[error("'{command}' is not supported by {model}")]
    #[diagnostic(code(homesafe::unsupported))]
    Unsupported { command: String, model: String },

    #[error("Device {device} is missing '{field}'")]
    #[diagnostic(code(homesafe::missing_field))]
    MissingField { device: String, field: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(homesafe::api_error))]
    Api { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(homesafe::timeout),
        help("The HomeSafe cloud is slow to respond; try again shortly.")
    )]
    Timeout { seconds: u64 },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(homesafe::profile_not_found),
        help("Add a [profiles.{name}] table to {path}")
    )]
    ProfileNotFound { name: String, path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homesafe::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(homesafe::config))]
    Config(Box<figment::Error>),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(homesafe::config))]
    Serialization(#[from] toml::ser::Error),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::NoSnapshot => CliError::Api {
                message: "no fleet data available".into(),
            },
            CoreError::DeviceNotFound { identifier } => CliError::DeviceNotFound { identifier },
            CoreError::MissingField { device, field } => CliError::MissingField { device, field },
            CoreError::Unsupported { operation, model } => CliError::Unsupported {
                command: operation,
                model,
            },
            CoreError::Refresh(e) => e.into(),
            CoreError::Api { message, status: _ } => CliError::Api { message },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<RefreshError> for CliError {
    fn from(err: RefreshError) -> Self {
        if let Some(seconds) = err.timeout_secs {
            return CliError::Timeout { seconds };
        }
        match err.kind {
            FailureKind::Auth => CliError::AuthFailed {
                profile: "current".into(),
                message: err.message,
            },
            FailureKind::Transient => CliError::ConnectionFailed {
                reason: err.message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                path: homesafe_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_refresh_failures_exit_with_auth_code() {
        let err = CliError::from(RefreshError::auth("session rejected"));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn core_errors_map_to_exit_codes() {
        let not_found = CliError::from(CoreError::DeviceNotFound {
            identifier: "Attic".into(),
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let timeout = CliError::from(CoreError::Timeout { timeout_secs: 10 });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn timed_out_refresh_exits_with_timeout_code() {
        let err = CliError::from(RefreshError::timed_out("fleet fetch", 10));
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(err.to_string(), CliError::Timeout { seconds: 10 }.to_string());

        let err = CliError::from(RefreshError::transient("connection reset"));
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
