//! Admin API billing response shapes

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationResponse {
    pub current_app_installation: AppInstallation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstallation {
    #[serde(default)]
    pub active_subscriptions: Vec<AppSubscription>,
    #[serde(default)]
    pub one_time_purchases: Option<Connection<OneTimePurchase>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSubscription {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub test: bool,
    #[serde(default)]
    pub line_items: Vec<SubscriptionLineItemNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionLineItemNode {
    pub id: String,
    pub plan: LineItemPlan,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPlan {
    pub pricing_details: PricingDetails,
}

/// `AppPricingDetails` union, discriminated by `__typename`.
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
pub enum PricingDetails {
    #[serde(rename_all = "camelCase")]
    AppUsagePricing {
        terms: String,
        balance_used: MoneyV2,
        capped_amount: MoneyV2,
    },
    /// Recurring pricing; nothing is selected for it
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoneyV2 {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
pub struct OneTimePurchase {
    pub name: String,
    #[serde(default)]
    pub test: bool,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPayload {
    pub confirmation_url: String,
}

impl AppInstallation {
    /// True when one of `plans` is paid for: an active subscription, or a
    /// one-time purchase in `ACTIVE` status. Test charges only count when
    /// `is_test` is set.
    pub fn has_active_payment(&self, plans: &[&str], is_test: bool) -> bool {
        let counts = |name: &str, test: bool| plans.contains(&name) && (is_test || !test);

        let subscribed = self
            .active_subscriptions
            .iter()
            .any(|s| counts(&s.name, s.test));

        let purchased = self
            .one_time_purchases
            .iter()
            .flat_map(|c| c.edges.iter())
            .any(|e| e.node.status == "ACTIVE" && counts(&e.node.name, e.node.test));

        subscribed || purchased
    }
}
