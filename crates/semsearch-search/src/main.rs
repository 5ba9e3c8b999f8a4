mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use semsearch_adapters::HashEmbedder;
use semsearch_core::logging::init_logging;

use config::Config;
use state::SearchState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    init_logging("logs", "search.log", "info")?;
    tracing::info!("starting semsearch-search on port {}", config.port);

    let embedder = Arc::new(HashEmbedder::new(config.dimension));
    let state = Arc::new(SearchState::new(&config, embedder)?);
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("semsearch-search listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
