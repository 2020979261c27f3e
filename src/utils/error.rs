//! Error handling for the admission filter
//!
//! This module defines all error types used throughout the crate.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the admission filter
pub type Result<T> = std::result::Result<T, ThrottleError>;

/// Main error type for the admission filter
#[derive(Error, Debug)]
pub enum ThrottleError {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Counter store errors other than Redis connectivity
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server lifecycle errors
    #[error("Server error: {0}")]
    Server(String),
}

impl ThrottleError {
    /// True when the error means the backing store could not be reached.
    ///
    /// The limiter fails open on these: the request is admitted without
    /// strict accounting rather than refused because infrastructure is down.
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            #[cfg(feature = "redis")]
            ThrottleError::Redis(_) => true,
            ThrottleError::Store(_) => true,
            _ => false,
        }
    }
}

impl ResponseError for ThrottleError {
    fn error_response(&self) -> HttpResponse {
        let (status, message) = match self {
            ThrottleError::Config(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "configuration error",
            ),
            #[cfg(feature = "redis")]
            ThrottleError::Redis(_) => (
                actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                "store unavailable",
            ),
            ThrottleError::Store(_) => (
                actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                "store unavailable",
            ),
            _ => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            ),
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": {
                "message": message,
                "detail": self.to_string(),
            }
        }))
    }
}
