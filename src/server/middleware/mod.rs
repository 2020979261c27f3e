//! HTTP middleware implementations
//!
//! This module provides the middleware for request processing:
//! - Rate limiting admission filter
//! - Request ID tracking

mod rate_limit;
mod request_id;

pub use rate_limit::{RateLimitMiddleware, RateLimitMiddlewareService};
pub use request_id::{RequestIdMiddleware, RequestIdMiddlewareService};
