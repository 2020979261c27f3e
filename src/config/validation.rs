//! Configuration validators
//!
//! Contradictory policy must be refused at startup, not discovered per
//! request.

use super::models::*;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }

        if self.port == 0 {
            return Err("Server port cannot be 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.url.is_empty() {
            return Err("Redis URL cannot be empty when Redis is enabled".to_string());
        }

        if self.connection_timeout == 0 {
            return Err("Redis connection timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for RateLimitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.window_secs == 0 {
            return Err("Window length must be greater than 0".to_string());
        }

        if self.max_requests == 0 {
            return Err("Max requests per window must be greater than 0".to_string());
        }

        if self.warning_threshold > self.max_requests {
            return Err(format!(
                "Warning threshold ({}) must not exceed max requests per window ({})",
                self.warning_threshold, self.max_requests
            ));
        }

        if self.key_namespace.is_empty() {
            return Err("Key namespace cannot be empty".to_string());
        }

        Ok(())
    }
}
