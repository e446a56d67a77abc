// Shared transport configuration for building the reqwest::Client.
//
// The session lives entirely in the cookie jar: login fills it, and
// previously captured cookies can be seeded into it directly.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use url::Url;

/// Production endpoint of the HomeSafe cloud.
pub const DEFAULT_API_URL: &str = "https://api.homesafe.kidde.com/api/v4/";

const USER_AGENT: &str = concat!("homesafe-rs/", env!("CARGO_PKG_VERSION"));

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// API root. Always normalized to end with `/` so relative joins work.
    pub base_url: Url,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout: Duration::from_secs(30),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Config pointing at a custom API root (staging, mock servers).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = normalize_base(base_url);
        self
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder.build().map_err(crate::error::Error::Transport)
    }
}

/// Ensure the URL path ends in `/` so `Url::join` appends instead of replacing.
pub(crate) fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let cfg = TransportConfig::default()
            .with_base_url(Url::parse("http://localhost:9000/api/v4").expect("valid"));
        assert_eq!(cfg.base_url.as_str(), "http://localhost:9000/api/v4/");
        assert_eq!(
            cfg.base_url.join("location").expect("join").as_str(),
            "http://localhost:9000/api/v4/location"
        );
    }

    #[test]
    fn default_points_at_production() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.base_url.as_str(), DEFAULT_API_URL);
        assert!(cfg.cookie_jar.is_none());
    }
}
