//! App billing
//!
//! - [`check`]: does the shop pay for one of the configured plans?
//! - [`request`]: create a charge and get the merchant confirmation URL
//! - [`request_billing`]: the install-time gate combining both
//! - [`usage`]: capped usage records

pub mod models;
pub mod plans;
pub mod queries;
pub mod usage;

pub use plans::{BillingConfig, BillingInterval, PlanConfig};
pub use usage::{SubscriptionLineItem, UsageOutcome, create_usage_record, find_usage_line_item};

use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;

use crate::shopify::{AdminApi, Session, ShopifyError, mutation_payload};
use models::{ConfirmationPayload, InstallationResponse};

#[derive(Debug, Error)]
pub enum BillingError {
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    #[error("Malformed billing response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("No active subscription line item for plan '{plan}' with terms '{terms}'")]
    LineItemNotFound { plan: String, terms: String },

    #[error("Plan '{0}' has no usage terms")]
    MissingUsageTerms(String),

    #[error("No billing plans configured")]
    NoPlans,

    #[error("Usage amount overflow: balance {balance} + increment {increment}")]
    AmountOverflow {
        balance: rust_decimal::Decimal,
        increment: rust_decimal::Decimal,
    },
}

/// Outcome of the install-time billing gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingDecision {
    /// An active payment exists; continue into the app
    Paid,
    /// Send the merchant to approve the charge
    Redirect(String),
}

pub async fn check(
    api: &dyn AdminApi,
    session: &Session,
    billing: &BillingConfig,
) -> Result<bool, BillingError> {
    let data = api
        .graphql(session, queries::APP_INSTALLATION_CHARGES, json!({}))
        .await?;
    let response: InstallationResponse = serde_json::from_value(data)?;
    Ok(response
        .current_app_installation
        .has_active_payment(&billing.plan_names(), billing.is_test))
}

fn money(amount: rust_decimal::Decimal, currency_code: &str) -> Value {
    json!({ "amount": amount, "currencyCode": currency_code })
}

/// Create a charge for `plan` and return the URL where the merchant approves it.
pub async fn request(
    api: &dyn AdminApi,
    session: &Session,
    plan: &PlanConfig,
    is_test: bool,
    return_url: &str,
) -> Result<String, BillingError> {
    let price = money(plan.amount, &plan.currency_code);

    let (document, root, variables) = match plan.interval {
        BillingInterval::OneTime => (
            queries::APP_PURCHASE_ONE_TIME_CREATE,
            "appPurchaseOneTimeCreate",
            json!({
                "name": plan.name,
                "price": price,
                "returnUrl": return_url,
                "test": is_test,
            }),
        ),
        BillingInterval::Usage => {
            let terms = plan
                .usage_terms
                .as_deref()
                .ok_or_else(|| BillingError::MissingUsageTerms(plan.name.clone()))?;
            let line_item = json!({
                "plan": {
                    "appUsagePricingDetails": {
                        "terms": terms,
                        "cappedAmount": price,
                    }
                }
            });
            (
                queries::APP_SUBSCRIPTION_CREATE,
                "appSubscriptionCreate",
                json!({
                    "name": plan.name,
                    "lineItems": [line_item],
                    "returnUrl": return_url,
                    "test": is_test,
                }),
            )
        }
        BillingInterval::Every30Days | BillingInterval::Annual => {
            let line_item = json!({
                "plan": {
                    "appRecurringPricingDetails": {
                        "price": price,
                        "interval": plan.interval.pricing_interval(),
                    }
                }
            });
            (
                queries::APP_SUBSCRIPTION_CREATE,
                "appSubscriptionCreate",
                json!({
                    "name": plan.name,
                    "lineItems": [line_item],
                    "returnUrl": return_url,
                    "test": is_test,
                }),
            )
        }
    };

    let data = api.graphql(session, document, variables).await?;
    let payload: ConfirmationPayload = serde_json::from_value(mutation_payload(&data, root)?)?;
    Ok(payload.confirmation_url)
}

/// Gate app entry on an active payment; request the first plan otherwise.
pub async fn request_billing(
    api: &dyn AdminApi,
    session: &Session,
    billing: &BillingConfig,
    return_url: &str,
) -> Result<BillingDecision, BillingError> {
    if check(api, session, billing).await? {
        return Ok(BillingDecision::Paid);
    }

    let plan = billing.first_plan().ok_or(BillingError::NoPlans)?;
    let url = request(api, session, plan, billing.is_test, return_url).await?;
    info!(shop = %session.shop, plan = %plan.name, "No active payment, requesting billing");
    Ok(BillingDecision::Redirect(url))
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    use crate::shopify::{AccessToken, AdminApi, Session, ShopifyError};

    pub fn session() -> Session {
        Session::offline("demo.myshopify.com", "shpat_test", "write_products")
    }

    pub fn line_items_response(balance: &str, cap: &str) -> Value {
        json!({
            "currentAppInstallation": {"activeSubscriptions": [{
                "id": "gid://shopify/AppSubscription/1",
                "name": "My plan",
                "test": true,
                "lineItems": [{
                    "id": "gid://shopify/AppSubscriptionLineItem/1",
                    "plan": {"pricingDetails": {
                        "__typename": "AppUsagePricing",
                        "terms": "One dollar per button click",
                        "balanceUsed": {"amount": balance},
                        "cappedAmount": {"amount": cap}
                    }}
                }]
            }]}
        })
    }

    /// Answers queries with `query_data` and mutations with `mutation_data`,
    /// recording every call.
    pub struct MockAdmin {
        query_data: Value,
        mutation_data: Value,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockAdmin {
        pub fn new(query_data: Value) -> Self {
            Self {
                query_data,
                mutation_data: json!({
                    "appUsageRecordCreate": {
                        "userErrors": [],
                        "appUsageRecord": {"id": "gid://shopify/AppUsageRecord/1"}
                    },
                    "appSubscriptionCreate": {
                        "userErrors": [],
                        "confirmationUrl": "https://demo.myshopify.com/admin/charges/confirm"
                    },
                    "appPurchaseOneTimeCreate": {
                        "userErrors": [],
                        "confirmationUrl": "https://demo.myshopify.com/admin/charges/one_time"
                    }
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_mutation_data(mut self, data: Value) -> Self {
            self.mutation_data = data;
            self
        }

        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AdminApi for MockAdmin {
        async fn graphql(
            &self,
            _session: &Session,
            query: &str,
            variables: Value,
        ) -> Result<Value, ShopifyError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), variables));
            if query.trim_start().starts_with("mutation") {
                Ok(self.mutation_data.clone())
            } else {
                Ok(self.query_data.clone())
            }
        }

        async fn request_access_token(
            &self,
            _shop: &str,
            _code: &str,
        ) -> Result<AccessToken, ShopifyError> {
            Ok(AccessToken {
                access_token: "shpat_test".into(),
                scope: "write_products".into(),
            })
        }
    }
}
