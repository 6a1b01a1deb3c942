//! HTTP handlers
//!
//! - [`auth`]: OAuth install flow and the billing gate
//! - [`webhooks`]: signed webhook receiver
//! - [`products`] / [`usage`]: session-authenticated app API
//! - [`frontend`]: embedded frontend entry point
//! - [`health`]: liveness

pub mod auth;
pub mod frontend;
pub mod health;
pub mod products;
pub mod usage;
pub mod webhooks;

pub use auth::{auth_begin, auth_callback};
pub use frontend::serve_index;
pub use health::{HealthResponse, health_check};
pub use products::{create_products, get_products_count};
pub use usage::create_usage;
pub use webhooks::receive_webhook;
