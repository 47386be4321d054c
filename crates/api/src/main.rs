use std::env;

use anyhow::Result;
use currencypal_api::{build_app, ApiConfig};
use currencypal_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("currencypal_api");

    let bind = env::var("CURRENCYPAL_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let config = ApiConfig::from_env();
    let rates_url = config.rates.base_url.clone();

    let app = build_app(config)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, rates_url = %rates_url, "currencypal api started");

    axum::serve(listener, app).await?;
    Ok(())
}
