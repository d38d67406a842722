// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is stored as TOML and includes:
//! - `base_url`: root of the REST backend
//! - `[http]`: request timeout
//! - `[cache]`: staleness, garbage collection and query retry defaults
//! - `[realtime]`: notification stream path, reconnect backoff, polling fallback
//! - `[auth]`: where the session token is persisted
//! - `[logging]`: tracing filter and optional log file

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "lms";
const TOKEN_FILE_NAME: &str = "token";

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the REST backend (e.g. `https://api.example.com/v1`).
    pub base_url: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Defaults applied to reads that do not declare their own windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds before cached data is considered stale (default: 60).
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,
    /// Seconds of inactivity before an entry is evicted (default: 300).
    #[serde(default = "default_gc_time_secs")]
    pub gc_time_secs: u64,
    /// Retries for failed network/server fetches (default: 3). Mutations never retry.
    #[serde(default = "default_retry")]
    pub retry: u32,
    /// Interval of the background eviction sweep in seconds (default: 60).
    #[serde(default = "default_gc_interval_secs")]
    pub gc_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            stale_time_secs: default_stale_time_secs(),
            gc_time_secs: default_gc_time_secs(),
            retry: default_retry(),
            gc_interval_secs: default_gc_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Path of the SSE endpoint relative to `base_url` (default: `/notifications/stream`).
    #[serde(default = "default_stream_path")]
    pub stream_path: String,
    /// Maximum reconnection attempts before giving up (default: 0 = unlimited).
    #[serde(default)]
    pub max_retries: u32,
    /// Initial delay for exponential backoff in milliseconds (default: 500).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts in seconds (default: 30).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Polling interval for notification reads while the stream is down (default: 30).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        RealtimeConfig {
            stream_path: default_stream_path(),
            max_retries: 0,
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl RealtimeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token file location. Defaults to `<data_local_dir>/lms/token`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset (default: `info`).
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Append logs to this file instead of stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_log_filter(),
            file: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_stale_time_secs() -> u64 {
    60
}

fn default_gc_time_secs() -> u64 {
    300
}

fn default_retry() -> u32 {
    3
}

fn default_gc_interval_secs() -> u64 {
    60
}

fn default_stream_path() -> String {
    "/notifications/stream".to_string()
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl ClientConfig {
    /// Creates a config with defaults for everything but the backend URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL is not http(s).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let config = ClientConfig {
            base_url: base_url.into(),
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
            realtime: RealtimeConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        };
        if let Some(msg) = config.validate_url() {
            return Err(Error::Config(msg));
        }
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: ClientConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        if let Some(msg) = config.validate_url() {
            return Err(Error::Config(msg));
        }
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validates that the base URL is an absolute http(s) URL.
    ///
    /// Returns an error message if the URL is invalid.
    pub fn validate_url(&self) -> Option<String> {
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => None,
            Ok(url) => Some(format!(
                "invalid base URL '{}': scheme '{}' is not http or https",
                self.base_url,
                url.scheme()
            )),
            Err(e) => Some(format!("invalid base URL '{}': {}", self.base_url, e)),
        }
    }

    /// Resolves the token file location.
    pub fn token_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.auth.token_path {
            return Ok(path.clone());
        }
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(TOKEN_FILE_NAME))
            .ok_or_else(|| Error::Config("no local data directory for the token file".to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
