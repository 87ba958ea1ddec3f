//! Client configuration and base-URL resolution.
//!
//! # Design
//! `ApiConfig` carries both candidate URLs; `Environment` describes where the
//! process runs. `resolve_base_url` is a pure function of the two, so the
//! choice can be tested without touching process state. The `from_env` /
//! `detect` constructors are the only places that read the environment.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://192.168.86.70/api";
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:5001/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Remote (production) endpoint.
    pub base_url: String,
    /// Endpoint used in development or when running on a local host.
    pub local_url: String,
    /// Headers sent with every request unless the caller overrides them.
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            local_url: DEFAULT_LOCAL_URL.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    /// Read `API_URL`, `API_URL_LOCAL` and `API_TIMEOUT_MS`, falling back to
    /// the defaults for anything unset, empty or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout = lookup("API_TIMEOUT_MS")
            .and_then(|ms| ms.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);
        Self {
            base_url: lookup("API_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.base_url),
            local_url: lookup("API_URL_LOCAL")
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.local_url),
            headers: defaults.headers,
            timeout,
        }
    }
}

/// Where the client is running: execution mode plus host name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub mode: String,
    pub host: String,
}

impl Environment {
    pub fn new(mode: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            host: host.into(),
        }
    }

    /// Mode comes from `APP_ENV` (default `production`). The host name is
    /// taken from `HOSTNAME`, then `/etc/hostname`.
    pub fn detect() -> Self {
        let mode = std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string());
        let host = std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
            .map(|h| h.trim().to_string())
            .unwrap_or_default();
        Self { mode, host }
    }

    pub fn is_development(&self) -> bool {
        self.mode == "development"
    }

    pub fn is_local_host(&self) -> bool {
        LOCAL_HOSTS.contains(&self.host.as_str())
    }
}

/// Pick the local URL in development or on a loopback host, the remote one
/// otherwise.
pub fn resolve_base_url<'a>(config: &'a ApiConfig, env: &Environment) -> &'a str {
    if env.is_development() || env.is_local_host() {
        &config.local_url
    } else {
        &config.base_url
    }
}
