use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};

use super::super::state::AppState;
use super::super::types::UsageResponse;
use crate::billing;
use crate::shopify::Session;

pub const CAPACITY_REACHED_MESSAGE: &str = "Could not create record because capacity was reached";

/// Charge one usage increment.
///
/// - 200: record created (`capacityReach` tells whether the cap is now hit)
/// - 400: refused, the record would exceed the capped amount
/// - 500: Admin API or billing failure, message in `error`
#[utoipa::path(
    get,
    path = "/api/usage/create",
    responses(
        (status = 200, description = "Usage record created", body = UsageResponse),
        (status = 400, description = "Capacity reached, nothing charged", body = UsageResponse),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Billing failure", body = UsageResponse)
    ),
    security(("session_token" = [])),
    tag = "Billing"
)]
pub async fn create_usage(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> (StatusCode, Json<UsageResponse>) {
    let result =
        billing::create_usage_record(state.shopify.as_ref(), &session, &state.config.billing)
            .await;

    let (status, capacity_reach, error) = match result {
        Ok(outcome) if outcome.refused_for_capacity() => (
            StatusCode::BAD_REQUEST,
            true,
            Some(CAPACITY_REACHED_MESSAGE.to_string()),
        ),
        Ok(outcome) => (StatusCode::OK, outcome.capacity_reached, None),
        Err(e) => {
            tracing::error!(shop = %session.shop, "Failed to process usage/create: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, false, Some(e.to_string()))
        }
    };

    (
        status,
        Json(UsageResponse {
            success: status == StatusCode::OK,
            capacity_reach,
            error,
        }),
    )
}
