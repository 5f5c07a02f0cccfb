use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::security::{RateLimitStatus, RateLimiterStats};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub max_requests: u32,
    pub window_ms: u64,
    pub active_entries: usize,
}

#[derive(Serialize)]
pub struct IdentifierStatus {
    pub identifier: String,
    #[serde(flatten)]
    pub status: RateLimitStatus,
}

#[derive(Serialize)]
pub struct ResetResult {
    pub identifier: String,
    pub reset: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let config = state.limiter.config();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        max_requests: config.max_requests,
        window_ms: config.window_ms,
        active_entries: state.limiter.stats().active_entries,
    })
}

pub async fn get_stats(State(state): State<AdminState>) -> Json<RateLimiterStats> {
    Json(state.limiter.stats())
}

pub async fn get_identifier(
    State(state): State<AdminState>,
    Path(identifier): Path<String>,
) -> Json<IdentifierStatus> {
    let status = state.limiter.status(&identifier);
    Json(IdentifierStatus { identifier, status })
}

pub async fn reset_identifier(
    State(state): State<AdminState>,
    Path(identifier): Path<String>,
) -> Json<ResetResult> {
    state.limiter.reset(&identifier);
    tracing::info!(identifier = %identifier, "Rate limit reset by admin");
    Json(ResetResult { identifier, reset: true })
}
