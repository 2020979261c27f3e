//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::limiter::RateLimiter;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc for cheap sharing across worker threads.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration (shared read-only)
    pub config: Arc<Config>,
    /// The request limiter, shared with the admission middleware
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Config, limiter: Arc<RateLimiter>) -> Self {
        Self {
            config: Arc::new(config),
            limiter,
        }
    }

    /// Get service configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
