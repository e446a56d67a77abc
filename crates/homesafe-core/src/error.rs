// ── Core error types ──
//
// User-facing errors from homesafe-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<homesafe_api::Error>`
// impl translates transport-layer errors into domain variants.

use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the HomeSafe cloud: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("No fleet data has been fetched yet")]
    NoSnapshot,

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Device {device} does not report required field '{field}'")]
    MissingField { device: String, field: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation not supported: {operation} on {model}")]
    Unsupported { operation: String, model: String },

    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether re-authenticating could resolve this error.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::AuthenticationFailed { .. } => true,
            Self::Refresh(e) => e.kind == FailureKind::Auth,
            _ => false,
        }
    }
}

// ── Refresh outcomes ─────────────────────────────────────────────────

/// How a failed poll cycle is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credentials rejected; polling cannot recover without re-authorization.
    Auth,
    /// Timeout, network, or server fault; the next tick retries.
    Transient,
}

/// A failed poll cycle.
///
/// Cloneable so one in-flight result can be handed to every caller
/// attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure: {message}")]
pub struct RefreshError {
    pub kind: FailureKind,
    pub message: String,
    /// Set when the cycle ran out of time; the limit that was hit.
    pub timeout_secs: Option<u64>,
}

impl RefreshError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Auth,
            message: message.into(),
            timeout_secs: None,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
            timeout_secs: None,
        }
    }

    /// A transient failure caused by exceeding a time limit.
    pub fn timed_out(what: &str, timeout_secs: u64) -> Self {
        Self {
            timeout_secs: Some(timeout_secs),
            ..Self::transient(format!("{what} timed out after {timeout_secs}s"))
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind == FailureKind::Auth
    }
}

impl From<&homesafe_api::Error> for RefreshError {
    fn from(err: &homesafe_api::Error) -> Self {
        if err.is_auth_expired() {
            Self::auth(err.to_string())
        } else if let homesafe_api::Error::Timeout { timeout_secs } = err {
            Self::timed_out("request", *timeout_secs)
        } else {
            Self::transient(err.to_string())
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<homesafe_api::Error> for CoreError {
    fn from(err: homesafe_api::Error) -> Self {
        match err {
            homesafe_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            homesafe_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            homesafe_api::Error::InvalidUrl(e) => CoreError::Internal(format!("Invalid URL: {e}")),
            homesafe_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            homesafe_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            homesafe_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
