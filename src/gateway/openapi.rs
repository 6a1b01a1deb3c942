//! OpenAPI / Swagger UI documentation of the app API
//!
//! - Swagger UI: `/docs`
//! - OpenAPI JSON: `/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{ActionResponse, ProductCountResponse, UsageResponse};

/// Session tokens issued by App Bridge
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Shopify session token (HS256, signed with the app secret, aud = API key)",
                ))
                .build();
            components.add_security_scheme("session_token", SecurityScheme::Http(scheme));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shopify Usage Billing API",
        version = "0.1.0",
        description = "Embedded app API: sample products and capped usage charges.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::products::get_products_count,
        crate::gateway::handlers::products::create_products,
        crate::gateway::handlers::usage::create_usage,
    ),
    components(
        schemas(
            HealthResponse,
            ActionResponse,
            ProductCountResponse,
            UsageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Products", description = "Sample products (session token required)"),
        (name = "Billing", description = "Usage charges (session token required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
