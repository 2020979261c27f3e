//! Rate limiting core
//!
//! `engine` holds the pure admission policy; `limiter` wires it to the
//! counter store.

pub mod engine;
pub mod limiter;

pub use engine::{CounterUpdate, Evaluation, QuotaInfo, RateLimitPolicy, Verdict};
pub use limiter::{Decision, RateLimiter};
