use std::sync::Arc;

use crate::config::AppConfig;
use crate::shopify::{AdminApi, OAuthStateStore, SessionStore};

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Admin API transport
    pub shopify: Arc<dyn AdminApi>,
    /// Offline sessions by id
    pub sessions: Arc<dyn SessionStore>,
    /// Pending OAuth state nonces
    pub oauth_states: Arc<OAuthStateStore>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        shopify: Arc<dyn AdminApi>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            shopify,
            sessions,
            oauth_states: Arc::new(OAuthStateStore::new()),
        }
    }

    /// Where the merchant lands once installed and paid: the app inside the
    /// admin when `host` is known, the app root otherwise.
    pub fn app_home_url(&self, shop: &str, host: Option<&str>) -> String {
        use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};

        let admin_host = host
            .and_then(|h| STANDARD_NO_PAD.decode(h.trim_end_matches('=')).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok());

        match admin_host {
            Some(admin) => format!(
                "https://{}/apps/{}",
                admin.trim_end_matches('/'),
                self.config.shopify.api_key
            ),
            None => format!("{}/?shop={}", self.config.app_url(), shop),
        }
    }

    pub fn auth_url(&self, shop: Option<&str>) -> String {
        match shop {
            Some(shop) => format!("{}/api/auth?shop={}", self.config.app_url(), shop),
            None => format!("{}/api/auth", self.config.app_url()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::test_support::MockAdmin;
    use crate::shopify::MemorySessionStore;

    fn state() -> AppState {
        let config = AppConfig::from_yaml_str(
            r#"
log_level: "info"
log_dir: "./logs"
log_file: "test.log"
use_json: false
rotation: "never"
gateway:
  host: "127.0.0.1"
  port: 0
shopify:
  api_key: "k"
  api_secret: "s"
  app_url: "https://app.example.com/"
"#,
        )
        .unwrap();
        AppState::new(
            config,
            Arc::new(MockAdmin::new(serde_json::json!({}))),
            Arc::new(MemorySessionStore::new()),
        )
    }

    #[test]
    fn test_app_home_url_decodes_host() {
        let state = state();
        let shop = "demo.myshopify.com";
        // padded and unpadded forms of the same host
        for host in [
            "YWRtaW4uc2hvcGlmeS5jb20vc3RvcmUvZGVtbw==",
            "YWRtaW4uc2hvcGlmeS5jb20vc3RvcmUvZGVtbw",
        ] {
            assert_eq!(
                state.app_home_url(shop, Some(host)),
                "https://admin.shopify.com/store/demo/apps/k"
            );
        }
        assert_eq!(
            state.app_home_url(shop, Some("ZGVtby5teXNob3BpZnkuY29tL2FkbWlu")),
            "https://demo.myshopify.com/admin/apps/k"
        );
    }

    #[test]
    fn test_app_home_url_falls_back_to_app_root() {
        let state = state();
        let expected = "https://app.example.com/?shop=demo.myshopify.com";
        assert_eq!(state.app_home_url("demo.myshopify.com", None), expected);
        assert_eq!(
            state.app_home_url("demo.myshopify.com", Some("%%%")),
            expected
        );
    }

    #[test]
    fn test_auth_url() {
        let state = state();
        assert_eq!(state.auth_url(None), "https://app.example.com/api/auth");
        assert_eq!(
            state.auth_url(Some("demo.myshopify.com")),
            "https://app.example.com/api/auth?shop=demo.myshopify.com"
        );
    }
}
