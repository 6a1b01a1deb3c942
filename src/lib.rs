//! Shopify usage billing
//!
//! Backend of an embedded Shopify app whose feature is paid per use against
//! a capped subscription.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup
//! - [`shopify`] - Admin API transport, sessions, OAuth, webhooks
//! - [`billing`] - payment check, billing requests, capped usage records
//! - [`products`] - sample products created by the paid feature
//! - [`gateway`] - axum HTTP server

pub mod billing;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod products;
pub mod shopify;

// Convenient re-exports at crate root
pub use billing::{BillingConfig, BillingDecision, BillingError, UsageOutcome};
pub use config::{AppConfig, ConfigError};
pub use gateway::{build_router, run_server, state::AppState};
pub use shopify::{AdminApi, GraphqlClient, MemorySessionStore, Session, ShopifyError};
