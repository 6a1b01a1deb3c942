use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

use crate::billing::BillingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    #[serde(default)]
    pub rotation: LogRotation,
    pub gateway: GatewayConfig,
    pub shopify: ShopifyConfig,
    #[serde(default)]
    pub billing: BillingConfig,
}

/// How often the log file is rolled over
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the built frontend (index.html + assets)
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Shopify app credentials and Admin API settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShopifyConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Public URL the app is served from, e.g. `https://billing-app.example.com`
    pub app_url: String,
    /// Comma separated access scopes requested at install
    #[serde(default)]
    pub scopes: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_static_dir() -> String {
    "./frontend/dist".to_string()
}

fn default_api_version() -> String {
    "2024-10".to_string()
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply environment overrides and validate.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Credentials and port usually come from the Shopify CLI environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("SHOPIFY_API_KEY") {
            self.shopify.api_key = key;
        }
        if let Ok(secret) = std::env::var("SHOPIFY_API_SECRET") {
            self.shopify.api_secret = secret;
        }
        let port = std::env::var("BACKEND_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .and_then(|p| p.parse::<u16>().ok());
        if let Some(port) = port {
            self.gateway.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shopify.api_key.is_empty() {
            return Err(ConfigError::Invalid("shopify.api_key is empty".into()));
        }
        if self.shopify.api_secret.is_empty() {
            return Err(ConfigError::Invalid("shopify.api_secret is empty".into()));
        }
        url::Url::parse(&self.shopify.app_url).map_err(|e| {
            ConfigError::Invalid(format!("shopify.app_url is not a URL: {}", e))
        })?;
        self.billing.validate().map_err(ConfigError::Invalid)
    }

    pub fn app_url(&self) -> &str {
        self.shopify.app_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::BillingInterval;
    use rust_decimal::Decimal;

    const YAML: &str = r#"
log_level: "info"
log_dir: "./logs"
log_file: "billing.log"
use_json: false
rotation: "daily"
gateway:
  host: "0.0.0.0"
  port: 8081
shopify:
  api_key: "key"
  api_secret: "secret"
  app_url: "https://billing.example.com/"
  scopes: "write_products"
"#;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.gateway.static_dir, "./frontend/dist");
        assert_eq!(config.shopify.api_version, "2024-10");
        assert!(config.billing.is_test);
        assert_eq!(config.billing.usage_increment, Decimal::ONE);

        let plan = config.billing.first_plan().unwrap();
        assert_eq!(plan.name, "My plan");
        assert_eq!(plan.interval, BillingInterval::Usage);
        assert_eq!(plan.usage_terms.as_deref(), Some("One dollar per button click"));
        config.validate().unwrap();
    }

    #[test]
    fn test_app_url_trailing_slash_trimmed() {
        let config = AppConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.app_url(), "https://billing.example.com");
    }

    #[test]
    fn test_billing_section_parsed() {
        let yaml = format!(
            "{}{}",
            YAML,
            r#"
billing:
  is_test: false
  usage_increment: 2.5
  plans:
    - name: "Pro"
      amount: 20
      currency_code: "EUR"
      interval: "EVERY_30_DAYS"
"#
        );
        let config = AppConfig::from_yaml_str(&yaml).unwrap();
        assert!(!config.billing.is_test);
        assert_eq!(config.billing.usage_increment, Decimal::new(25, 1));
        let plan = config.billing.first_plan().unwrap();
        assert_eq!(plan.interval, BillingInterval::Every30Days);
        assert_eq!(plan.currency_code, "EUR");
        config.validate().unwrap();
    }

    #[test]
    fn test_rotation_parsed() {
        let config = AppConfig::from_yaml_str(YAML).unwrap();
        assert_eq!(config.rotation, LogRotation::Daily);

        let hourly = YAML.replace(r#"rotation: "daily""#, r#"rotation: "hourly""#);
        let config = AppConfig::from_yaml_str(&hourly).unwrap();
        assert_eq!(config.rotation, LogRotation::Hourly);

        let bogus = YAML.replace(r#"rotation: "daily""#, r#"rotation: "weekly""#);
        assert!(matches!(
            AppConfig::from_yaml_str(&bogus),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_secret_rejected() {
        let mut config = AppConfig::from_yaml_str(YAML).unwrap();
        config.shopify.api_secret.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
