pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use middleware::session_auth_middleware;
use state::AppState;
use types::ActionResponse;

async fn api_not_found() -> (StatusCode, Json<ActionResponse>) {
    (StatusCode::NOT_FOUND, Json(ActionResponse::failed("Not found")))
}

/// Assemble the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // App API (session token required)
    // ==========================================================================
    let protected_routes = Router::new()
        .route("/products/count", get(handlers::get_products_count))
        .route("/products/create", get(handlers::create_products))
        .route("/usage/create", get(handlers::create_usage))
        .layer(from_fn_with_state(state.clone(), session_auth_middleware));

    // ==========================================================================
    // Install flow, webhooks and health (no session token)
    // ==========================================================================
    let api_routes = Router::new()
        .route("/auth", get(handlers::auth_begin))
        .route("/auth/callback", get(handlers::auth_callback))
        .route("/webhooks", post(handlers::receive_webhook))
        .route("/health", get(handlers::health_check))
        .merge(protected_routes)
        .fallback(api_not_found);

    // Built frontend assets; anything else is the app entry point
    let frontend = ServeDir::new(&state.config.gateway.static_dir)
        .append_index_html_on_directories(false)
        .fallback(get(handlers::serve_index).with_state::<()>(state.clone()));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .fallback_service(frontend)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process exits.
pub async fn run_server(state: Arc<AppState>) -> std::io::Result<()> {
    let gateway = &state.config.gateway;
    let addr = format!("{}:{}", gateway.host, gateway.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs: http://{}/docs", addr);
    tracing::info!("App URL: {}", state.config.app_url());

    axum::serve(listener, build_router(state)).await
}
