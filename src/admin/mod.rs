//! Administrative API over the rate limiter.
//!
//! Served on its own listener (normally loopback only) and protected by a
//! bearer token. Used by `contact-cli` and by operators lifting a block.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::security::RateLimiter;
use self::auth::admin_auth_middleware;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub limiter: Arc<RateLimiter>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(limiter: Arc<RateLimiter>, api_key: &str) -> Router {
    let state = AdminState {
        limiter,
        api_key: Arc::from(api_key),
    };
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/rate-limit/stats", get(get_stats))
        .route(
            "/admin/rate-limit/{identifier}",
            get(get_identifier).delete(reset_identifier),
        )
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
