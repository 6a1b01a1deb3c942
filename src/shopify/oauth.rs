//! OAuth install flow helpers
//!
//! Authorization code grant as run by Shopify:
//! 1. `/api/auth?shop=` redirects to `https://{shop}/admin/oauth/authorize`
//! 2. Shopify calls back with `code`, `shop`, `state`, `timestamp`, `hmac`
//! 3. The callback query is HMAC-verified, the state nonce consumed and the
//!    code exchanged for an offline access token

use dashmap::DashMap;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use url::Url;

use super::ShopifyError;
use crate::config::ShopifyConfig;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an issued state nonce
pub const STATE_TTL: Duration = Duration::from_secs(600);

pub const CALLBACK_PATH: &str = "/api/auth/callback";

/// Normalize and validate a `*.myshopify.com` shop domain.
pub fn sanitize_shop(shop: &str) -> Option<String> {
    let shop = shop.trim().to_ascii_lowercase();
    let shop = shop
        .strip_prefix("https://")
        .or_else(|| shop.strip_prefix("http://"))
        .unwrap_or(&shop)
        .trim_end_matches('/');

    let name = shop.strip_suffix(".myshopify.com")?;
    let mut chars = name.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphanumeric() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }
    Some(shop.to_string())
}

/// URL the merchant is sent to for granting access.
pub fn authorize_url(
    config: &ShopifyConfig,
    shop: &str,
    state: &str,
) -> Result<String, ShopifyError> {
    let mut url = Url::parse(&format!("https://{}/admin/oauth/authorize", shop))
        .map_err(|_| ShopifyError::InvalidShop(shop.to_string()))?;
    let redirect_uri = format!(
        "{}{}",
        config.app_url.trim_end_matches('/'),
        CALLBACK_PATH
    );
    url.query_pairs_mut()
        .append_pair("client_id", &config.api_key)
        .append_pair("scope", &config.scopes)
        .append_pair("redirect_uri", &redirect_uri)
        .append_pair("state", state);
    Ok(url.into())
}

/// Message signed by Shopify: `key=value` pairs sorted by key, joined by `&`,
/// without the `hmac` and `signature` parameters.
fn signing_message(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .filter(|(k, _)| k.as_str() != "hmac" && k.as_str() != "signature")
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Verify the hex `hmac` parameter of an OAuth callback query.
pub fn verify_query_hmac(params: &BTreeMap<String, String>, api_secret: &str) -> bool {
    let Some(expected) = params.get("hmac").and_then(|h| hex::decode(h).ok()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(api_secret.as_bytes()) else {
        return false;
    };
    mac.update(signing_message(params).as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Compute the hex HMAC of a query, as Shopify would.
pub fn sign_query(
    params: &BTreeMap<String, String>,
    api_secret: &str,
) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())?;
    mac.update(signing_message(params).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Outstanding OAuth `state` nonces, keyed by nonce.
#[derive(Debug, Default)]
pub struct OAuthStateStore {
    pending: DashMap<String, (String, Instant)>,
}

impl OAuthStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a nonce bound to `shop`.
    pub fn issue(&self, shop: &str) -> String {
        self.purge_expired();
        let state = uuid::Uuid::new_v4().simple().to_string();
        self.pending
            .insert(state.clone(), (shop.to_string(), Instant::now()));
        state
    }

    /// Consume a nonce. Valid once, for the shop it was issued to, within
    /// [`STATE_TTL`].
    pub fn consume(&self, state: &str, shop: &str) -> bool {
        match self.pending.remove(state) {
            Some((_, (issued_shop, issued_at))) => {
                issued_shop == shop && issued_at.elapsed() < STATE_TTL
            }
            None => false,
        }
    }

    fn purge_expired(&self) {
        self.pending
            .retain(|_, (_, issued_at)| issued_at.elapsed() < STATE_TTL);
    }
}
