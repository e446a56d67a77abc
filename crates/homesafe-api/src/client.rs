// HomeSafe cloud HTTP client
//
// Wraps `reqwest::Client` with URL construction relative to the API root,
// status classification, and cookie-backed session handling. Device
// payloads are returned as raw JSON objects.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use reqwest::cookie::Jar;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Dataset, DeviceCommand, Location};
use crate::transport::{TransportConfig, normalize_base};

/// Client for the HomeSafe cloud API.
///
/// All session state lives in the cookie jar. Clones are not provided;
/// share it behind an `Arc`.
pub struct HomesafeClient {
    http: reqwest::Client,
    base_url: Url,
    cookie_jar: Option<Arc<Jar>>,
    /// Request timeout baked into `http`, when known.
    timeout: Option<Duration>,
}

impl HomesafeClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// A cookie jar is created automatically if the config has none,
    /// since the session is cookie-based.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(config.base_url),
            cookie_jar: config.cookie_jar,
            timeout: Some(config.timeout),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller owns cookie handling; [`seed_cookies`](Self::seed_cookies)
    /// is a no-op on such a client.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            cookie_jar: None,
            timeout: None,
        }
    }

    /// Seed the jar with previously captured session cookies.
    pub fn seed_cookies(&self, cookies: &BTreeMap<String, String>) {
        let Some(ref jar) = self.cookie_jar else {
            debug!("client has no cookie jar, ignoring seeded cookies");
            return;
        };
        for (name, value) in cookies {
            jar.add_cookie_str(&format!("{name}={value}"), &self.base_url);
        }
        debug!(count = cookies.len(), "seeded session cookies");
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Log in with account credentials.
    ///
    /// `POST auth/login`. On success the session cookies are stored in
    /// the jar and used by every following request.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.endpoint("auth/login")?;
        debug!(email, "logging in");

        let resp = self
            .send(self.http.post(url).json(&json!({
                "email": email,
                "password": password.expose_secret(),
            })))
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Authentication {
                message: "login rejected -- check email and password".into(),
            }),
            s => Err(Error::Api {
                status: s.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// List locations for the account.
    ///
    /// `GET location`
    pub async fn list_locations(&self) -> Result<Vec<Location>, Error> {
        let url = self.endpoint("location")?;
        self.get(url).await
    }

    /// List raw device objects for one location.
    ///
    /// `GET location/{location_id}/device`
    pub async fn list_devices(&self, location_id: &str) -> Result<Vec<Map<String, Value>>, Error> {
        let url = self.endpoint(&format!("location/{location_id}/device"))?;
        self.get(url).await
    }

    /// Fetch every location and the devices under each.
    pub async fn get_data(&self) -> Result<Dataset, Error> {
        let locations = self.list_locations().await?;
        let mut devices = Vec::new();

        for location in &locations {
            let id = id_segment(&location.id);
            let mut batch = self.list_devices(&id).await?;
            debug!(location = %id, devices = batch.len(), "fetched location devices");
            devices.append(&mut batch);
        }

        Ok(Dataset { locations, devices })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Send a remote command to a device.
    ///
    /// `POST location/{location_id}/device/{device_id}/thing/command/{command}`
    pub async fn device_command(
        &self,
        location_id: &str,
        device_id: &str,
        command: DeviceCommand,
    ) -> Result<(), Error> {
        let url = self.endpoint(&format!(
            "location/{location_id}/device/{device_id}/thing/command/{command}"
        ))?;
        debug!(location_id, device_id, %command, "sending device command");

        let resp = self.send(self.http.post(url)).await?;
        self.check_status(resp).await.map(drop)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.send(self.http.get(url)).await?;
        let body = self.check_status(resp).await?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        request.send().await.map_err(|e| self.transport_error(e))
    }

    /// Map the HTTP status to an error, returning the body on success.
    async fn check_status(&self, resp: Response) -> Result<String, Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: format!("request refused with HTTP {}", status.as_u16()),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                message: body,
            })
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }
}

/// Render a JSON id (number or string) as a path segment.
fn id_segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_segment_renders_numbers_and_strings() {
        assert_eq!(id_segment(&Value::from(17)), "17");
        assert_eq!(id_segment(&Value::from("abc")), "abc");
    }
}
