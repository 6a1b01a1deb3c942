//! Billing plan configuration
//!
//! Plans are kept in configuration order: the first plan is the one
//! requested when a shop has no active payment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a plan is charged. Serialized with the Admin API enum spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingInterval {
    #[serde(rename = "ONE_TIME")]
    OneTime,
    #[serde(rename = "EVERY_30_DAYS")]
    Every30Days,
    #[serde(rename = "ANNUAL")]
    Annual,
    #[serde(rename = "USAGE")]
    Usage,
}

impl BillingInterval {
    /// `AppPricingInterval` value for recurring plans.
    pub fn pricing_interval(self) -> Option<&'static str> {
        match self {
            Self::Every30Days => Some("EVERY_30_DAYS"),
            Self::Annual => Some("ANNUAL"),
            Self::OneTime | Self::Usage => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub name: String,
    /// Price for one-time and recurring plans, capped amount for usage plans
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency_code: String,
    pub interval: BillingInterval,
    /// Terms shown to the merchant; required for usage plans
    #[serde(default)]
    pub usage_terms: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// Request test charges (development stores are never billed)
    #[serde(default = "default_is_test")]
    pub is_test: bool,
    /// Amount charged per usage record
    #[serde(default = "default_usage_increment")]
    pub usage_increment: Decimal,
    #[serde(default = "default_plans")]
    pub plans: Vec<PlanConfig>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_is_test() -> bool {
    true
}

fn default_usage_increment() -> Decimal {
    Decimal::ONE
}

fn default_plans() -> Vec<PlanConfig> {
    vec![PlanConfig {
        name: "My plan".to_string(),
        amount: Decimal::new(5, 0),
        currency_code: default_currency(),
        interval: BillingInterval::Usage,
        usage_terms: Some("One dollar per button click".to_string()),
    }]
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            is_test: default_is_test(),
            usage_increment: default_usage_increment(),
            plans: default_plans(),
        }
    }
}

impl BillingConfig {
    pub fn first_plan(&self) -> Option<&PlanConfig> {
        self.plans.first()
    }

    pub fn plan_names(&self) -> Vec<&str> {
        self.plans.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.plans.is_empty() {
            return Err("billing.plans must contain at least one plan".into());
        }
        if self.usage_increment <= Decimal::ZERO {
            return Err("billing.usage_increment must be positive".into());
        }
        for plan in &self.plans {
            if plan.amount <= Decimal::ZERO {
                return Err(format!("plan '{}' amount must be positive", plan.name));
            }
            if plan.interval == BillingInterval::Usage
                && plan.usage_terms.as_deref().is_none_or(str::is_empty)
            {
                return Err(format!("usage plan '{}' requires usage_terms", plan.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BillingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.plan_names(), vec!["My plan"]);
    }

    #[test]
    fn test_usage_plan_without_terms_rejected() {
        let mut config = BillingConfig::default();
        config.plans[0].usage_terms = None;
        let err = config.validate().unwrap_err();
        assert!(err.contains("usage_terms"));
    }

    #[test]
    fn test_non_positive_increment_rejected() {
        let config = BillingConfig {
            usage_increment: Decimal::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_plans_rejected() {
        let config = BillingConfig {
            plans: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.first_plan().is_none());
    }

    #[test]
    fn test_interval_wire_names() {
        let interval: BillingInterval = serde_yaml::from_str("EVERY_30_DAYS").unwrap();
        assert_eq!(interval, BillingInterval::Every30Days);
        assert_eq!(interval.pricing_interval(), Some("EVERY_30_DAYS"));
        assert_eq!(BillingInterval::Usage.pricing_interval(), None);
    }
}
