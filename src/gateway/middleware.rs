//! Session-token authentication for `/api/*` routes.
//!
//! A request passes when its bearer token is a valid session token and an
//! offline session exists for the token's shop. The [`Session`] is then
//! available to handlers as an `Extension`.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::state::AppState;
use crate::shopify::Session;
use crate::shopify::session_token::decode_session_token;

pub const REAUTHORIZE_HEADER: &str = "x-shopify-api-request-failure-reauthorize";
pub const REAUTHORIZE_URL_HEADER: &str = "x-shopify-api-request-failure-reauthorize-url";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAuthErrorCode {
    MissingToken,
    InvalidToken,
    NoSession,
}

impl SessionAuthErrorCode {
    pub fn name(self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::NoSession => "NO_SESSION",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionAuthError {
    pub code: SessionAuthErrorCode,
    pub message: String,
    /// Where the frontend should send the merchant to re-authenticate
    pub reauthorize_url: String,
}

#[derive(Debug, Serialize)]
struct SessionAuthErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for SessionAuthError {
    fn into_response(self) -> Response {
        let body = SessionAuthErrorBody {
            error: self.code.name(),
            message: self.message,
        };
        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        let headers = response.headers_mut();
        headers.insert(REAUTHORIZE_HEADER, HeaderValue::from_static("1"));
        if let Ok(url) = HeaderValue::from_str(&self.reauthorize_url) {
            headers.insert(REAUTHORIZE_URL_HEADER, url);
        }
        response
    }
}

pub async fn session_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, SessionAuthError> {
    let fail = |code, message: &str, shop: Option<&str>| SessionAuthError {
        code,
        message: message.to_string(),
        reauthorize_url: state.auth_url(shop),
    };

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| {
            fail(
                SessionAuthErrorCode::MissingToken,
                "Missing bearer session token",
                None,
            )
        })?;

    let shopify = &state.config.shopify;
    let claims = decode_session_token(token, &shopify.api_key, &shopify.api_secret)
        .map_err(|e| {
            debug!("Rejected session token: {}", e);
            fail(
                SessionAuthErrorCode::InvalidToken,
                "Invalid or expired session token",
                None,
            )
        })?;
    let shop = claims.shop().map_err(|e| {
        fail(SessionAuthErrorCode::InvalidToken, &e.to_string(), None)
    })?;

    let session: Session = state
        .sessions
        .load(&Session::offline_id(&shop))
        .ok_or_else(|| {
            fail(
                SessionAuthErrorCode::NoSession,
                "No session for shop, app must be reinstalled",
                Some(shop.as_str()),
            )
        })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}
