//! Shopify usage billing - app server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐    ┌──────────────┐
//! │ Frontend │───▶│ Gateway  │───▶│ Billing  │───▶│ Admin GraphQL│
//! │ (App Br.)│    │ (axum)   │    │ (guards) │    │  (Shopify)   │
//! └──────────┘    └──────────┘    └──────────┘    └──────────────┘
//! ```
//!
//! Usage: `shopify_usage_billing [--env dev] [--port 8081]`

use std::sync::Arc;

use anyhow::Context;
use shopify_usage_billing::{AppConfig, AppState, GraphqlClient, MemorySessionStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config =
        AppConfig::load(&env).with_context(|| format!("loading configuration for '{}'", env))?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = shopify_usage_billing::logging::init_logging(&app_config);

    tracing::info!("Starting usage billing app in {} mode", env);
    for plan in &app_config.billing.plans {
        tracing::info!(
            "Billing plan '{}': {} {} ({:?})",
            plan.name,
            plan.amount,
            plan.currency_code,
            plan.interval
        );
    }

    let client = GraphqlClient::new(&app_config.shopify).context("building Admin API client")?;
    let state = Arc::new(AppState::new(
        app_config,
        Arc::new(client),
        Arc::new(MemorySessionStore::new()),
    ));

    shopify_usage_billing::run_server(state)
        .await
        .context("gateway server error")
}
