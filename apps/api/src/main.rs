mod config;
mod errors;
mod llm_client;
mod render;
mod routes;
mod state;
mod suggestions;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::render::LatexmkRenderer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: missing required env vars abort startup
    let config = Config::from_env()?;

    // Structured logging. The crate name has a dash, tracing targets use underscores.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting texfit API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.generation_timeout);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let renderer = LatexmkRenderer::new(config.latexmk_bin.clone(), config.render_timeout);
    info!(
        "Renderer: {} (timeout {}s)",
        config.latexmk_bin,
        config.render_timeout.as_secs()
    );
    info!(
        "Keyword budget: {} suggestions per keyword",
        config.max_suggestions_per_keyword
    );

    let state = AppState {
        config: config.clone(),
        generator: Arc::new(llm),
        renderer: Arc::new(renderer),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the browser extension calls from arbitrary origins

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
