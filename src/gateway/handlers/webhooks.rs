use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use super::super::state::AppState;
use crate::shopify::webhook::{
    HMAC_HEADER, SHOP_HEADER, TOPIC_HEADER, WebhookTopic, verify_webhook_hmac,
};

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// POST /api/webhooks
///
/// The three privacy topics are acknowledged; this app stores no customer
/// data. `app/uninstalled` drops the shop's sessions.
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let verified = header(&headers, HMAC_HEADER)
        .is_some_and(|sig| verify_webhook_hmac(&body, sig, &state.config.shopify.api_secret));
    if !verified {
        tracing::warn!("Webhook with missing or invalid HMAC");
        return StatusCode::UNAUTHORIZED;
    }

    let shop = header(&headers, SHOP_HEADER).unwrap_or_default();
    let Some(topic) = header(&headers, TOPIC_HEADER).and_then(WebhookTopic::parse) else {
        tracing::warn!(shop = %shop, "Webhook for unhandled topic");
        return StatusCode::NOT_FOUND;
    };

    match topic {
        WebhookTopic::CustomersDataRequest
        | WebhookTopic::CustomersRedact
        | WebhookTopic::ShopRedact => {
            tracing::info!(
                shop = %shop,
                topic = topic.as_str(),
                bytes = body.len(),
                "Privacy webhook"
            );
        }
        WebhookTopic::AppUninstalled => {
            let removed = state.sessions.delete_by_shop(shop);
            tracing::info!(shop = %shop, removed, "App uninstalled");
        }
    }
    StatusCode::OK
}
