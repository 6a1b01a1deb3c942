use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode};

use super::super::state::AppState;
use super::super::types::{ActionResponse, ProductCountResponse};
use crate::products;
use crate::shopify::Session;

/// Number of products in the shop
#[utoipa::path(
    get,
    path = "/api/products/count",
    responses(
        (status = 200, description = "Product count", body = ProductCountResponse),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Admin API failure", body = ActionResponse)
    ),
    security(("session_token" = [])),
    tag = "Products"
)]
pub async fn get_products_count(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<ProductCountResponse>, (StatusCode, Json<ActionResponse>)> {
    let count = products::count(state.shopify.as_ref(), &session)
        .await
        .map_err(|e| {
            tracing::error!(shop = %session.shop, "Failed to process products/count: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionResponse::failed(e.to_string())),
            )
        })?;
    Ok(Json(ProductCountResponse { count }))
}

/// Populate the shop with a few sample products
#[utoipa::path(
    get,
    path = "/api/products/create",
    responses(
        (status = 200, description = "Products created", body = ActionResponse),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Admin API failure", body = ActionResponse)
    ),
    security(("session_token" = [])),
    tag = "Products"
)]
pub async fn create_products(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> (StatusCode, Json<ActionResponse>) {
    match products::create_products(
        state.shopify.as_ref(),
        &session,
        products::DEFAULT_PRODUCTS_COUNT,
    )
    .await
    {
        Ok(ids) => {
            tracing::info!(shop = %session.shop, created = ids.len(), "Products created");
            (StatusCode::OK, Json(ActionResponse::ok()))
        }
        Err(e) => {
            tracing::error!(shop = %session.shop, "Failed to process products/create: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ActionResponse::failed(e.to_string())),
            )
        }
    }
}
