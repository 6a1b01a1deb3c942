//! OAuth install flow
//!
//! The callback ends with the billing gate: a shop without an active payment
//! is sent to approve the first configured plan before it reaches the app.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::super::state::AppState;
use super::super::types::ActionResponse;
use crate::billing::{self, BillingDecision};
use crate::shopify::{Session, oauth};

#[derive(Debug, Deserialize)]
pub struct AuthBeginQuery {
    pub shop: Option<String>,
}

fn reject(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ActionResponse::failed(message))).into_response()
}

/// GET /api/auth?shop=
pub async fn auth_begin(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthBeginQuery>,
) -> Response {
    let Some(shop) = query.shop.as_deref().and_then(oauth::sanitize_shop) else {
        return reject(StatusCode::BAD_REQUEST, "Missing or invalid shop parameter");
    };

    let nonce = state.oauth_states.issue(&shop);
    match oauth::authorize_url(&state.config.shopify, &shop, &nonce) {
        Ok(url) => {
            tracing::info!(shop = %shop, "Starting OAuth");
            Redirect::to(&url).into_response()
        }
        Err(e) => reject(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// GET /api/auth/callback
pub async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Response {
    let shopify = &state.config.shopify;

    if !oauth::verify_query_hmac(&params, &shopify.api_secret) {
        tracing::warn!("OAuth callback with invalid HMAC");
        return reject(StatusCode::BAD_REQUEST, "Invalid OAuth callback signature");
    }
    let Some(shop) = params.get("shop").and_then(|s| oauth::sanitize_shop(s)) else {
        return reject(StatusCode::BAD_REQUEST, "Missing or invalid shop parameter");
    };
    let nonce = params.get("state").map(String::as_str).unwrap_or_default();
    if !state.oauth_states.consume(nonce, &shop) {
        return reject(StatusCode::FORBIDDEN, "OAuth state mismatch or expired");
    }
    let Some(code) = params.get("code") else {
        return reject(StatusCode::BAD_REQUEST, "Missing authorization code");
    };

    let token = match state.shopify.request_access_token(&shop, code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(shop = %shop, "Failed to exchange OAuth code: {}", e);
            return reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };
    let session = Session::offline(&shop, token.access_token, token.scope);
    state.sessions.store(session.clone());
    tracing::info!(shop = %shop, "Stored offline session");

    let home = state.app_home_url(&shop, params.get("host").map(String::as_str));
    match billing::request_billing(
        state.shopify.as_ref(),
        &session,
        &state.config.billing,
        &home,
    )
    .await
    {
        Ok(BillingDecision::Paid) => Redirect::to(&home).into_response(),
        Ok(BillingDecision::Redirect(confirmation_url)) => {
            Redirect::to(&confirmation_url).into_response()
        }
        Err(e) => {
            tracing::error!(shop = %shop, "Billing check failed: {}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
