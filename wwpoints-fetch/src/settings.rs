//! Polling settings shared by the API client and the pollers.

use std::time::Duration;

use crate::client::DEFAULT_TIMEOUT_SECS;
use crate::retry::ReauthPolicy;

/// Default interval between cycles (15 minutes).
pub const DEFAULT_INTERVAL_SECS: u64 = 15 * 60;

/// Settings for polling.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Time between the start of consecutive cycles.
    pub interval: Duration,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Re-login bound within one cycle.
    pub reauth: ReauthPolicy,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            reauth: ReauthPolicy::default(),
        }
    }
}

impl PollSettings {
    /// Sets the cycle interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the re-login policy.
    pub fn with_reauth(mut self, reauth: ReauthPolicy) -> Self {
        self.reauth = reauth;
        self
    }
}
