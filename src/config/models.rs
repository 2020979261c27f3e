//! Configuration models

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> u64 {
    100
}

fn default_warning_threshold() -> u64 {
    80
}

fn default_delay_ms() -> u64 {
    500
}

fn default_key_namespace() -> String {
    "request_count".to_string()
}

/// Top-level configuration for the admission filter service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Shared counter store configuration
    #[serde(default)]
    pub redis: RedisConfig,
    /// Rate limiting policy
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Worker count (0 = one per core)
    #[serde(default)]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

/// Redis connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Use Redis as the counter store; when false the limiter falls back to
    /// an in-process store (single-instance deployments only)
    #[serde(default)]
    pub enabled: bool,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            enabled: false,
            connection_timeout: default_connection_timeout(),
        }
    }
}

/// Rate limiting policy configuration
///
/// Immutable for the process lifetime. The counter window is fixed, not
/// sliding: it starts when a client's key is created and ends when the key
/// expires in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Maximum requests per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
    /// Count at which admitted requests start being delayed and flagged
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u64,
    /// Artificial delay applied to near-limit requests, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Counter update strategy
    #[serde(default)]
    pub mode: CounterMode,
    /// Key namespace, prepended to the client identity in store keys
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            warning_threshold: default_warning_threshold(),
            delay_ms: default_delay_ms(),
            mode: CounterMode::default(),
            key_namespace: default_key_namespace(),
        }
    }
}

impl RateLimitConfig {
    /// Window length as a `Duration`
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Warning-path delay as a `Duration`
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Store key for one client identity: `<namespace>_<identity>`
    pub fn counter_key(&self, identity: &str) -> String {
        format!("{}_{}", self.key_namespace, identity)
    }
}

/// Counter update strategy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CounterMode {
    /// Separate get and set against the store. Concurrent requests from the
    /// same client may read the same stale count and all be admitted.
    #[default]
    ReadModifyWrite,
    /// Atomic increment-and-fetch with TTL applied on first write. Closes the
    /// stale-read race. The raw counter keeps advancing while a client is
    /// rejected, but the window TTL is never extended by rejected traffic.
    AtomicIncrement,
}
