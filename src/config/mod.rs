//! Configuration management
//!
//! This module handles loading and validation of the filter configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{Result, ThrottleError};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Filter configuration
    pub filter: FilterConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ThrottleError::Config(format!("Failed to read config file: {}", e)))?;

        let filter: FilterConfig = serde_yaml::from_str(&content)
            .map_err(|e| ThrottleError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { filter };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Recognized variables: `THROTTLEGUARD_HOST`, `THROTTLEGUARD_PORT`,
    /// `THROTTLEGUARD_REDIS_URL`, `THROTTLEGUARD_WINDOW_SECS`,
    /// `THROTTLEGUARD_MAX_REQUESTS`, `THROTTLEGUARD_WARNING_THRESHOLD`,
    /// `THROTTLEGUARD_DELAY_MS`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut filter = FilterConfig::default();

        if let Ok(host) = std::env::var("THROTTLEGUARD_HOST") {
            filter.server.host = host;
        }
        if let Ok(port) = std::env::var("THROTTLEGUARD_PORT") {
            filter.server.port = port
                .parse()
                .map_err(|e| ThrottleError::Config(format!("Invalid THROTTLEGUARD_PORT: {}", e)))?;
        }
        if let Ok(url) = std::env::var("THROTTLEGUARD_REDIS_URL") {
            filter.redis.url = url;
            filter.redis.enabled = true;
        }
        filter.rate_limit.window_secs =
            env_u64("THROTTLEGUARD_WINDOW_SECS", filter.rate_limit.window_secs)?;
        filter.rate_limit.max_requests =
            env_u64("THROTTLEGUARD_MAX_REQUESTS", filter.rate_limit.max_requests)?;
        filter.rate_limit.warning_threshold = env_u64(
            "THROTTLEGUARD_WARNING_THRESHOLD",
            filter.rate_limit.warning_threshold,
        )?;
        filter.rate_limit.delay_ms = env_u64("THROTTLEGUARD_DELAY_MS", filter.rate_limit.delay_ms)?;

        let config = Self { filter };
        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.filter.server
    }

    /// Get Redis configuration
    pub fn redis(&self) -> &RedisConfig {
        &self.filter.redis
    }

    /// Get rate limiting policy
    pub fn rate_limit(&self) -> &RateLimitConfig {
        &self.filter.rate_limit
    }

    /// Validate the entire configuration; fatal at startup on failure
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.filter
            .server
            .validate()
            .map_err(|e| ThrottleError::Config(format!("Server config error: {}", e)))?;

        self.filter
            .redis
            .validate()
            .map_err(|e| ThrottleError::Config(format!("Redis config error: {}", e)))?;

        self.filter
            .rate_limit
            .validate()
            .map_err(|e| ThrottleError::Config(format!("Rate limit config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|e| ThrottleError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
server:
  host: "127.0.0.1"
  port: 9090

redis:
  url: "redis://localhost:6379"
  enabled: true

rate_limit:
  window_secs: 60
  max_requests: 100
  warning_threshold: 80
  delay_ms: 500
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.server().host, "127.0.0.1");
        assert_eq!(config.server().port, 9090);
        assert!(config.redis().enabled);
        assert_eq!(config.rate_limit().max_requests, 100);
    }

    #[tokio::test]
    async fn test_config_from_file_rejects_bad_policy() {
        let config_content = r#"
rate_limit:
  max_requests: 5
  warning_threshold: 10
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let result = Config::from_file(temp_file.path()).await;
        assert!(matches!(result, Err(ThrottleError::Config(_))));
    }

    #[tokio::test]
    async fn test_config_from_missing_file() {
        let result = Config::from_file("/nonexistent/throttleguard.yaml").await;
        assert!(matches!(result, Err(ThrottleError::Config(_))));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }
}
