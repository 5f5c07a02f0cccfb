//! Rate-limit response headers.
//!
//! Every contact response after the admit check carries
//! `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
//! (epoch seconds, rounded up). Refusals also carry `Retry-After`.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::security::rate_limit::RateLimitResult;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Build the header set describing `result`.
pub fn rate_limit_headers(result: &RateLimitResult) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(result.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(result.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(result.reset_at.div_ceil(1000)));
    if let Some(retry_after) = result.retry_after_secs {
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    }
    headers
}
