// ── Runtime coordinator configuration ──
//
// Describes *how often* and *how patiently* to poll. Built by the CLI (or
// any embedding host) and handed in; core never reads config files.

use std::time::Duration;

/// Default poll cadence.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound on one fleet fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Time between background polls. Zero disables the poll task;
    /// refreshes then happen only on request.
    pub update_interval: Duration,
    /// A fetch running longer than this is abandoned as a transient failure.
    pub fetch_timeout: Duration,
}

impl CoordinatorConfig {
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}
