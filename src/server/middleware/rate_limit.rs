//! Rate limiting middleware
//!
//! Applies the admission decision to each request: rejected requests are
//! answered 429 without reaching the downstream handler, warned requests are
//! paused for the configured delay before forwarding, and admitted responses
//! carry the quota headers.

use crate::limiter::{QuotaInfo, RateLimiter, Verdict};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

const HEADER_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const HEADER_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const HEADER_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
const HEADER_WARNING: HeaderName = HeaderName::from_static("x-ratelimit-warning");

const REJECT_BODY: &str = "Rate limit exceeded. Try again later.";

/// Rate limit middleware for Actix-web
pub struct RateLimitMiddleware {
    limiter: Arc<RateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service,
            limiter: Arc::clone(&self.limiter),
        }))
    }
}

/// Service implementation for rate limit middleware
pub struct RateLimitMiddlewareService<S> {
    service: S,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let limiter = Arc::clone(&self.limiter);
        let identity = client_identity(&req);

        // Not polled until awaited; the warning delay below runs first.
        let fut = self.service.call(req);

        Box::pin(async move {
            let decision = limiter.handle(&identity).await;

            match decision.verdict {
                Verdict::Reject => {
                    debug!(identity = %identity, "Request rejected by rate limiter");
                    return Err(actix_web::error::ErrorTooManyRequests(REJECT_BODY));
                }
                Verdict::AdmitWithWarning => {
                    if let Some(delay) = decision.delay {
                        debug!(identity = %identity, delay_ms = delay.as_millis() as u64, "Near limit, delaying request");
                        tokio::time::sleep(delay).await;
                    }
                }
                Verdict::Admit => {}
            }

            let mut res = fut.await?;

            if let Some(quota) = decision.quota {
                attach_quota_headers(res.headers_mut(), &quota);
                if decision.verdict == Verdict::AdmitWithWarning {
                    res.headers_mut()
                        .insert(HEADER_WARNING, HeaderValue::from_static("true"));
                }
            }

            Ok(res)
        })
    }
}

/// Client identity for rate limiting: the originating network address.
///
/// Empty when the peer address cannot be resolved, which admits the request
/// unconditionally downstream.
fn client_identity(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default()
}

fn attach_quota_headers(headers: &mut actix_web::http::header::HeaderMap, quota: &QuotaInfo) {
    headers.insert(HEADER_LIMIT, header_value(quota.limit));
    headers.insert(HEADER_REMAINING, header_value(quota.remaining));
    headers.insert(HEADER_RESET, header_value(quota.reset_secs));
}

fn header_value(value: u64) -> HeaderValue {
    HeaderValue::from_str(&value.to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("0"))
}
