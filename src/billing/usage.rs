//! Usage records against a capped subscription line item
//!
//! The line item is fetched on every call; balance and cap are never cached.
//! A record is refused up front when it would push the balance over the cap,
//! and the outcome reports whether the cap is reached afterwards.

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info};

use super::models::{AppSubscription, InstallationResponse, PricingDetails};
use super::{BillingConfig, BillingError, PlanConfig, queries};
use crate::shopify::{AdminApi, Session, mutation_payload};

/// Usage line item of the active subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionLineItem {
    pub id: String,
    pub balance_used: Decimal,
    pub capped_amount: Decimal,
}

impl SubscriptionLineItem {
    /// Balance after charging `increment`.
    pub fn balance_after(&self, increment: Decimal) -> Result<Decimal, BillingError> {
        self.balance_used
            .checked_add(increment)
            .ok_or(BillingError::AmountOverflow {
                balance: self.balance_used,
                increment,
            })
    }

    /// Charging `increment` would take the balance past the cap.
    pub fn exceeds_cap(&self, increment: Decimal) -> Result<bool, BillingError> {
        Ok(self.balance_after(increment)? > self.capped_amount)
    }

    /// Charging `increment` brings the balance to or past the cap.
    pub fn reaches_cap(&self, increment: Decimal) -> Result<bool, BillingError> {
        Ok(self.balance_after(increment)? >= self.capped_amount)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageOutcome {
    pub capacity_reached: bool,
    pub created_record: bool,
}

impl UsageOutcome {
    /// Nothing was charged because the cap would have been exceeded.
    pub fn refused_for_capacity(&self) -> bool {
        self.capacity_reached && !self.created_record
    }
}

/// Pick the line item of the subscription named `plan_name` whose usage
/// terms are `terms`. The last match wins.
pub fn select_line_item(
    subscriptions: &[AppSubscription],
    plan_name: &str,
    terms: &str,
) -> Option<SubscriptionLineItem> {
    subscriptions
        .iter()
        .filter(|s| s.name == plan_name)
        .flat_map(|s| s.line_items.iter())
        .filter_map(|item| match &item.plan.pricing_details {
            PricingDetails::AppUsagePricing {
                terms: item_terms,
                balance_used,
                capped_amount,
            } if item_terms == terms => Some(SubscriptionLineItem {
                id: item.id.clone(),
                balance_used: balance_used.amount,
                capped_amount: capped_amount.amount,
            }),
            _ => None,
        })
        .last()
}

fn usage_terms(plan: &PlanConfig) -> Result<&str, BillingError> {
    plan.usage_terms
        .as_deref()
        .ok_or_else(|| BillingError::MissingUsageTerms(plan.name.clone()))
}

pub async fn find_usage_line_item(
    api: &dyn AdminApi,
    session: &Session,
    plan: &PlanConfig,
) -> Result<SubscriptionLineItem, BillingError> {
    let terms = usage_terms(plan)?;
    let data = api
        .graphql(session, queries::APP_SUBSCRIPTION_LINE_ITEMS, json!({}))
        .await?;
    let response: InstallationResponse = serde_json::from_value(data)?;

    select_line_item(
        &response.current_app_installation.active_subscriptions,
        &plan.name,
        terms,
    )
    .ok_or_else(|| BillingError::LineItemNotFound {
        plan: plan.name.clone(),
        terms: terms.to_string(),
    })
}

/// Charge one usage increment against the first configured plan.
pub async fn create_usage_record(
    api: &dyn AdminApi,
    session: &Session,
    billing: &BillingConfig,
) -> Result<UsageOutcome, BillingError> {
    let plan = billing.first_plan().ok_or(BillingError::NoPlans)?;
    let increment = billing.usage_increment;
    let line_item = find_usage_line_item(api, session, plan).await?;

    // Production shops reject records past the cap; development shops
    // would accept them, so the guard has to live here.
    if line_item.exceeds_cap(increment)? {
        debug!(
            shop = %session.shop,
            balance = %line_item.balance_used,
            cap = %line_item.capped_amount,
            "Usage record refused, capacity reached"
        );
        return Ok(UsageOutcome {
            capacity_reached: true,
            created_record: false,
        });
    }

    let variables = json!({
        "subscriptionLineItemId": line_item.id,
        "description": usage_terms(plan)?,
        "price": {
            "amount": increment,
            "currencyCode": plan.currency_code,
        },
    });
    let data = api
        .graphql(session, queries::APP_USAGE_RECORD_CREATE, variables)
        .await?;
    mutation_payload(&data, "appUsageRecordCreate")?;

    info!(
        shop = %session.shop,
        amount = %increment,
        line_item = %line_item.id,
        "Usage record created"
    );

    Ok(UsageOutcome {
        capacity_reached: line_item.reaches_cap(increment)?,
        created_record: true,
    })
}
