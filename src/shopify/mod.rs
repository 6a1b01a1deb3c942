//! Shopify Admin API plumbing
//!
//! - [`client`]: GraphQL transport behind the [`AdminApi`] trait
//! - [`session`]: offline sessions and their storage
//! - [`oauth`]: install flow (authorize URL, callback HMAC, state nonces)
//! - [`session_token`]: embedded-app bearer tokens
//! - [`webhook`]: webhook signature verification and topics

pub mod client;
pub mod oauth;
pub mod session;
pub mod session_token;
pub mod webhook;

pub use client::{AccessToken, AdminApi, GraphqlClient, mutation_payload};
pub use oauth::OAuthStateStore;
pub use session::{MemorySessionStore, Session, SessionStore};
pub use session_token::{SessionTokenClaims, SessionTokenError};
pub use webhook::WebhookTopic;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while talking to the Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// The API answered with an error status or a GraphQL `errors` array.
    /// The full response body is kept so it can be reported verbatim.
    #[error("{message}\n{}", pretty_json(.response))]
    GraphqlQuery {
        message: String,
        response: serde_json::Value,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing field in response: {0}")]
    MissingData(String),

    /// `userErrors` returned by a mutation
    #[error("User errors: {}", format_user_errors(.0))]
    UserErrors(Vec<UserError>),

    #[error("Invalid shop domain: {0}")]
    InvalidShop(String),
}

/// A mutation `userErrors` entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graphql_error_appends_response() {
        let err = ShopifyError::GraphqlQuery {
            message: "GraphQL Client: Throttled".to_string(),
            response: json!({"errors": [{"message": "Throttled"}]}),
        };
        let text = err.to_string();
        let (head, body) = text.split_once('\n').unwrap();
        assert_eq!(head, "GraphQL Client: Throttled");
        let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(parsed["errors"][0]["message"], "Throttled");
        // pretty printed, so the payload spans several lines
        assert!(body.lines().count() > 1);
    }

    #[test]
    fn test_user_errors_formatting() {
        let err = ShopifyError::UserErrors(vec![
            UserError {
                field: Some(vec!["input".into(), "title".into()]),
                message: "Title can't be blank".into(),
            },
            UserError {
                field: None,
                message: "Capped amount reached".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "User errors: input.title: Title can't be blank; Capped amount reached"
        );
    }
}
