//! Admin API GraphQL transport
//!
//! Handlers and billing code only see the [`AdminApi`] trait so they can be
//! exercised against canned responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{Session, ShopifyError, UserError};
use crate::config::ShopifyConfig;

/// Token returned by the OAuth code exchange.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Run a query or mutation and return its `data` object.
    async fn graphql(
        &self,
        session: &Session,
        query: &str,
        variables: Value,
    ) -> Result<Value, ShopifyError>;

    /// Exchange an OAuth authorization code for an offline access token.
    async fn request_access_token(
        &self,
        shop: &str,
        code: &str,
    ) -> Result<AccessToken, ShopifyError>;
}

/// `reqwest` implementation of [`AdminApi`].
pub struct GraphqlClient {
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
    api_version: String,
}

impl GraphqlClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("shopify_usage_billing/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            api_version: config.api_version.clone(),
        })
    }

    pub fn graphql_url(&self, shop: &str) -> String {
        format!("https://{}/admin/api/{}/graphql.json", shop, self.api_version)
    }
}

#[async_trait]
impl AdminApi for GraphqlClient {
    async fn graphql(
        &self,
        session: &Session,
        query: &str,
        variables: Value,
    ) -> Result<Value, ShopifyError> {
        let url = self.graphql_url(&session.shop);
        debug!(shop = %session.shop, "Admin GraphQL request");

        let response = self
            .http
            .post(&url)
            .header("X-Shopify-Access-Token", &session.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let payload = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        check_graphql_response(status.as_u16(), payload)
    }

    async fn request_access_token(
        &self,
        shop: &str,
        code: &str,
    ) -> Result<AccessToken, ShopifyError> {
        let url = format!("https://{}/admin/oauth/access_token", shop);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "client_id": self.api_key,
                "client_secret": self.api_secret,
                "code": code,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::GraphqlQuery {
                message: format!("Access token request failed ({})", status),
                response: Value::String(body),
            });
        }
        Ok(response.json().await?)
    }
}

/// Turn a raw Admin API response into its `data` object.
///
/// Non-2xx statuses and non-empty `errors` arrays are query errors carrying
/// the whole payload.
pub fn check_graphql_response(status: u16, payload: Value) -> Result<Value, ShopifyError> {
    if !(200..300).contains(&status) {
        return Err(ShopifyError::GraphqlQuery {
            message: format!("Received an error response ({}) from Shopify", status),
            response: payload,
        });
    }

    let first_error = payload
        .get("errors")
        .and_then(Value::as_array)
        .filter(|errors| !errors.is_empty())
        .map(|errors| {
            errors[0]
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown GraphQL error")
                .to_string()
        });
    if let Some(message) = first_error {
        return Err(ShopifyError::GraphqlQuery {
            message: format!("GraphQL query returned errors: {}", message),
            response: payload,
        });
    }

    match payload.get("data") {
        Some(data) if !data.is_null() => Ok(data.clone()),
        _ => Err(ShopifyError::MissingData("data".to_string())),
    }
}

/// Extract a mutation's payload object from `data`, failing on `userErrors`.
pub fn mutation_payload(data: &Value, root: &str) -> Result<Value, ShopifyError> {
    let payload = data
        .get(root)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ShopifyError::MissingData(root.to_string()))?;

    if let Some(errors) = payload.get("userErrors") {
        let errors: Vec<UserError> = serde_json::from_value(errors.clone())?;
        if !errors.is_empty() {
            return Err(ShopifyError::UserErrors(errors));
        }
    }
    Ok(payload.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GraphqlClient {
        GraphqlClient::new(&ShopifyConfig {
            api_key: "key".into(),
            api_secret: "secret".into(),
            app_url: "https://app.example.com".into(),
            scopes: String::new(),
            api_version: "2024-10".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_graphql_url() {
        assert_eq!(
            client().graphql_url("demo.myshopify.com"),
            "https://demo.myshopify.com/admin/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn test_data_returned_on_success() {
        let payload = json!({"data": {"shop": {"name": "Demo"}}});
        let data = check_graphql_response(200, payload).unwrap();
        assert_eq!(data["shop"]["name"], "Demo");
    }

    #[test]
    fn test_errors_array_is_query_error() {
        let payload = json!({
            "errors": [{"message": "Field 'nope' doesn't exist on type 'QueryRoot'"}],
        });
        match check_graphql_response(200, payload) {
            Err(ShopifyError::GraphqlQuery { message, response }) => {
                assert!(message.contains("Field 'nope'"));
                assert!(response["errors"].is_array());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_error_status_keeps_body() {
        let err = check_graphql_response(401, Value::String("Invalid API key".into())).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Received an error response (401) from Shopify\n"));
        assert!(text.contains("Invalid API key"));
    }

    #[test]
    fn test_null_data_is_missing() {
        assert!(matches!(
            check_graphql_response(200, json!({"data": null})),
            Err(ShopifyError::MissingData(_))
        ));
    }

    #[test]
    fn test_mutation_payload_user_errors() {
        let data = json!({
            "appUsageRecordCreate": {
                "userErrors": [{
                    "field": ["price"],
                    "message": "Total price exceeds balance remaining"
                }],
                "appUsageRecord": null,
            }
        });
        match mutation_payload(&data, "appUsageRecordCreate") {
            Err(ShopifyError::UserErrors(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field.as_deref(), Some(&["price".to_string()][..]));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_mutation_payload_ok() {
        let data = json!({
            "appUsageRecordCreate": {
                "userErrors": [],
                "appUsageRecord": {"id": "gid://shopify/AppUsageRecord/1"},
            }
        });
        let payload = mutation_payload(&data, "appUsageRecordCreate").unwrap();
        assert_eq!(payload["appUsageRecord"]["id"], "gid://shopify/AppUsageRecord/1");
        assert!(matches!(
            mutation_payload(&data, "productCreate"),
            Err(ShopifyError::MissingData(_))
        ));
    }
}
