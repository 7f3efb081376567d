//! Host and timeout configuration shared by every call of a `Client`.
//!
//! # Design
//! The host lives behind an `Arc<RwLock<_>>` so that clones of a client (and
//! requests still being prepared) observe a `ChangeHost` immediately. The
//! timeout and query encoding are fixed once the config is built.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::args::QueryEncoding;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

pub const HOST_ENV: &str = "WEBREQ_HOST";
pub const TIMEOUT_ENV: &str = "WEBREQ_TIMEOUT";

#[derive(Debug, Clone)]
pub struct Config {
    host: Arc<RwLock<String>>,
    timeout: Duration,
    query_encoding: QueryEncoding,
}

impl Config {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: Arc::new(RwLock::new(host.into())),
            timeout,
            query_encoding: QueryEncoding::default(),
        }
    }

    /// Build from startup parameters as a host application supplies them.
    ///
    /// A missing or blank host falls back to `127.0.0.1`. A missing timeout,
    /// or one that is not a whole number of milliseconds, falls back to
    /// 3000 ms. `0` disables the timeout.
    pub fn from_params(host: Option<&str>, timeout: Option<&str>) -> Self {
        let host = match host.map(str::trim) {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => DEFAULT_HOST.to_string(),
        };

        let timeout_ms = match timeout.map(str::trim) {
            None | Some("") => DEFAULT_TIMEOUT_MS,
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                tracing::warn!(value = raw, "timeout is not a number, using {DEFAULT_TIMEOUT_MS} ms");
                DEFAULT_TIMEOUT_MS
            }),
        };

        Self::new(host, Duration::from_millis(timeout_ms))
    }

    /// Build from `WEBREQ_HOST` and `WEBREQ_TIMEOUT`, with the same fallbacks
    /// as `from_params`.
    pub fn from_env() -> Self {
        let host = std::env::var(HOST_ENV).ok();
        let timeout = std::env::var(TIMEOUT_ENV).ok();
        Self::from_params(host.as_deref(), timeout.as_deref())
    }

    pub fn with_query_encoding(mut self, encoding: QueryEncoding) -> Self {
        self.query_encoding = encoding;
        self
    }

    pub fn host(&self) -> String {
        self.host
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the host. No validation is performed; a bad host shows up as
    /// a failed request later.
    pub fn set_host(&self, host: impl Into<String>) {
        let host = host.into();
        tracing::info!(%host, "host changed");
        *self.host.write().unwrap_or_else(PoisonError::into_inner) = host;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn query_encoding(&self) -> QueryEncoding {
        self.query_encoding
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_params(None, None)
    }
}
