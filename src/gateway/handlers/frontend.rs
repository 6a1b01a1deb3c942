use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::super::state::AppState;
use crate::shopify::{Session, oauth};

#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub shop: Option<String>,
}

/// Entry point of the embedded frontend for any path not matched elsewhere.
///
/// A shop that has not installed the app (no offline session) is sent
/// through OAuth first.
pub async fn serve_index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShopQuery>,
) -> Response {
    if let Some(shop) = query.shop.as_deref().and_then(oauth::sanitize_shop) {
        if state.sessions.load(&Session::offline_id(&shop)).is_none() {
            return Redirect::to(&format!("/api/auth?shop={}", shop)).into_response();
        }
    }

    let index = Path::new(&state.config.gateway.static_dir).join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to read {}: {}", index.display(), e);
            (StatusCode::NOT_FOUND, "Frontend not built").into_response()
        }
    }
}
