//! HTTP handlers
//!
//! The protected service itself is a collaborator, not part of this crate;
//! these handlers give the filter something to stand in front of.

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// Liveness endpoint, registered outside the rate-limited scope
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": crate::NAME,
        "version": crate::VERSION,
    }))
}

/// Demo downstream handler: echoes the path it was reached on
pub async fn echo(path: web::Path<String>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "path": path.into_inner(),
    }))
}
