use std::env;

use anyhow::{Context, Result};
use ilm_api::build_app;
use ilm_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("ilm_api");

    let bind = env::var("ILM_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let app = build_app()?;

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(bind = %bind, "ilm companion api started");

    axum::serve(listener, app).await?;
    Ok(())
}
