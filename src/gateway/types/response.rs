//! Response bodies of the app API
//!
//! Field names follow what the embedded frontend reads.

use serde::Serialize;
use utoipa::ToSchema;

/// Result of an action endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    #[schema(example = true)]
    pub success: bool,
    /// Error message, null on success
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Result of `GET /api/usage/create`
#[derive(Debug, Serialize, ToSchema)]
pub struct UsageResponse {
    pub success: bool,
    /// True once the usage balance has reached the capped amount
    #[serde(rename = "capacityReach")]
    #[schema(example = false)]
    pub capacity_reach: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductCountResponse {
    #[schema(example = 5)]
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_response_wire_format() {
        let body = serde_json::to_value(UsageResponse {
            success: false,
            capacity_reach: true,
            error: Some("Could not create record because capacity was reached".into()),
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "capacityReach": true,
                "error": "Could not create record because capacity was reached"
            })
        );
    }

    #[test]
    fn test_action_response_null_error() {
        let body = serde_json::to_value(ActionResponse::ok()).unwrap();
        assert_eq!(body, json!({"success": true, "error": null}));
    }
}
