mod dto;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

use mockdrill_core::registry::SessionRegistry;
use mockdrill_service::chat_oracle::ChatOracle;
use mockdrill_service::config::Config;
use mockdrill_service::vision::VisionAnalyzer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load application configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    // Build the shared registry with live collaborators.
    let oracle = Arc::new(ChatOracle::new(
        config.api_key()?.to_string(),
        config.chat_model.clone(),
        config.endpoint().to_string(),
    ));
    let analyzer = Arc::new(VisionAnalyzer::new(config.analyzer_url.clone()));
    let registry = Arc::new(SessionRegistry::new(
        oracle,
        analyzer,
        config.registry_config(),
    ));

    // Permissive CORS so a separate frontend can talk to the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(registry).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting interview API, listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
