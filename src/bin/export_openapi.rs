//! Export the OpenAPI document of the app API
//!
//! Usage:
//!   cargo run --bin export_openapi > openapi.json
//!   cargo run --bin export_openapi -- --output docs/openapi.json

use shopify_usage_billing::gateway::openapi::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let json = ApiDoc::openapi().to_pretty_json()?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--output") => {
            let path = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("--output requires a path"))?;
            std::fs::write(path, &json)?;
            eprintln!("OpenAPI document written to {}", path);
        }
        _ => println!("{}", json),
    }
    Ok(())
}
