//! # ThrottleGuard
//!
//! An inline request-admission filter for HTTP services: counts requests per
//! client over a fixed window in a shared Redis store and admits, delays, or
//! rejects them against a configured policy.
//!
//! ## Behavior
//!
//! - **Admit**: counts below the warning threshold pass straight through.
//! - **Admit with warning**: counts in `[warning_threshold, max_requests)`
//!   are paused for a configured delay and flagged with
//!   `X-RateLimit-Warning: true` before forwarding.
//! - **Reject**: counts at or above `max_requests` are answered
//!   `429 Too Many Requests` without reaching the downstream handler, and
//!   without advancing the counter.
//!
//! Counters expire with the window TTL; expiry is the only reset path. If the
//! store is unreachable the filter fails open and admits.
//!
//! ## Usage as a library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use throttleguard::config::RateLimitConfig;
//! use throttleguard::limiter::RateLimiter;
//! use throttleguard::storage::InMemoryCounterStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let limiter = RateLimiter::new(
//!         RateLimitConfig::default(),
//!         Arc::new(InMemoryCounterStore::new()),
//!     );
//!     let decision = limiter.handle("203.0.113.7").await;
//!     println!("{:?}", decision.verdict);
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod limiter;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use limiter::{Decision, QuotaInfo, RateLimiter, Verdict};
pub use storage::CounterStore;
pub use utils::error::{Result, ThrottleError};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
