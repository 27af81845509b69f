use super::state::ApiState;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::{Json, response::IntoResponse};
use depot_derive::{api_handler, api_model};
use depot_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

#[api_model]
/// Health check response
struct HealthResponse {
    /// `up`, or `degraded` when the storage root is unreachable
    status: &'static str,
    /// Version
    version: &'static str,
    /// Uptime in seconds
    uptime: u64,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service and storage root are available", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "Storage root is unreachable", body = HealthResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let storage_ok = tokio::fs::metadata(state.storage.root()).await.is_ok_and(|m| m.is_dir());
    let (code, status) =
        if storage_ok { (StatusCode::OK, "up") } else { (StatusCode::SERVICE_UNAVAILABLE, "degraded") };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime: START_TIME.elapsed().as_secs(),
    };

    (
        code,
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
