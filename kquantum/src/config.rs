//! Application configuration
//!
//! Values come from, in increasing priority: defaults, an optional JSON file
//! and `KQ_*` environment variables.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr, time::Duration};

const DEFAULT_API_BASE_URL: &str = "https://api.swiftquantum.app";
const DEFAULT_CONNECT_TIMEOUT: u64 = 30;
const DEFAULT_READ_TIMEOUT: u64 = 60;
const DEFAULT_WRITE_TIMEOUT: u64 = 60;

/// Environment variable overriding [`AppConfig::api_base_url`]
pub const ENV_API_BASE_URL: &str = "KQ_API_BASE_URL";
/// Environment variable overriding [`AppConfig::debug`]
pub const ENV_DEBUG: &str = "KQ_DEBUG";
/// Environment variable overriding [`AppConfig::connect_timeout`], in seconds
pub const ENV_CONNECT_TIMEOUT: &str = "KQ_CONNECT_TIMEOUT_SECS";
/// Environment variable overriding [`AppConfig::read_timeout`], in seconds
pub const ENV_READ_TIMEOUT: &str = "KQ_READ_TIMEOUT_SECS";
/// Environment variable overriding [`AppConfig::write_timeout`], in seconds
pub const ENV_WRITE_TIMEOUT: &str = "KQ_WRITE_TIMEOUT_SECS";

/// Configuration shared by the whole object graph through
/// [`AppContext`](crate::context::AppContext)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the backend API
    ///
    /// Default: `https://api.swiftquantum.app`
    pub api_base_url: String,

    /// Enables verbose request logging
    ///
    /// Default: `false`
    pub debug: bool,

    /// Default: 30 seconds
    #[serde(rename = "connect_timeout_secs", with = "secs")]
    pub connect_timeout: Duration,

    /// Default: 60 seconds
    #[serde(rename = "read_timeout_secs", with = "secs")]
    pub read_timeout: Duration,

    /// Default: 60 seconds
    #[serde(rename = "write_timeout_secs", with = "secs")]
    pub write_timeout: Duration,
}

impl Default for AppConfig {
    #[inline]
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            debug: false,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT),
        }
    }
}

impl AppConfig {
    /// Parses a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|err| Error::config(format!("unable to read {}: {err}", path.display())))?;
        Self::from_json(&json)
    }

    /// Loads the configuration from the defaults and the process environment
    pub fn from_env() -> Result<Self, Error> {
        Self::default().merge_env(|name| std::env::var(name).ok())
    }

    /// Overrides values with the `KQ_*` variables returned by `lookup`, then validates
    pub fn merge_env<F>(mut self, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>
    {
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(debug) = lookup(ENV_DEBUG) {
            self.debug = parse_var(ENV_DEBUG, &debug)?;
        }
        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT) {
            self.connect_timeout = Duration::from_secs(parse_var(ENV_CONNECT_TIMEOUT, &secs)?);
        }
        if let Some(secs) = lookup(ENV_READ_TIMEOUT) {
            self.read_timeout = Duration::from_secs(parse_var(ENV_READ_TIMEOUT, &secs)?);
        }
        if let Some(secs) = lookup(ENV_WRITE_TIMEOUT) {
            self.write_timeout = Duration::from_secs(parse_var(ENV_WRITE_TIMEOUT, &secs)?);
        }
        self.validate()?;
        Ok(self)
    }

    /// Sets the base URL of the backend API
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Enables verbose request logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the write timeout
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Checks that the base URL is a non-empty http(s) URL
    pub fn validate(&self) -> Result<(), Error> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(Error::config("`api_base_url` must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::config(format!("`api_base_url` must be an http(s) URL, got `{url}`")));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("invalid value `{value}` for {name}")))
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
