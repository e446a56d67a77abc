use thiserror::Error;

/// Top-level error type for the `homesafe-api` crate.
///
/// Covers every failure mode of the cloud session: authentication,
/// transport, non-success HTTP statuses, and payload decoding.
/// `homesafe-core` classifies these into fatal and transient failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected or request refused with 401/403.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the configured client timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status that is not an auth failure.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the cloud refused the session and only
    /// re-authentication can resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authentication_is_auth_expired() {
        assert!(
            Error::Authentication {
                message: "bad password".into()
            }
            .is_auth_expired()
        );
        assert!(!Error::Timeout { timeout_secs: 10 }.is_auth_expired());
        assert!(
            !Error::Api {
                status: 404,
                message: "missing".into()
            }
            .is_auth_expired()
        );
    }
}
