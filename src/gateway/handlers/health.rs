//! Health check handler

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Json, http::StatusCode};
use utoipa::ToSchema;

#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
}

/// Liveness probe. The service holds no connections of its own, so being
/// able to answer is being healthy.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
    ),
    tag = "System"
)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            timestamp_ms,
        }),
    )
}
