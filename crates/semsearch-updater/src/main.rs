mod config;
mod error;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use semsearch_adapters::{HashEmbedder, InMemoryCatalog};
use semsearch_core::logging::init_logging;

use config::Config;
use state::UpdaterState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    init_logging("logs", "updater.log", "info")?;
    tracing::info!("starting semsearch-updater on port {}", config.port);

    // The embedding model and catalog database are external collaborators;
    // this binary wires in the in-process fakes from `semsearch-adapters`
    // until a real model/DB is connected.
    let catalog = Arc::new(InMemoryCatalog::new());
    let embedder = Arc::new(HashEmbedder::new(config.dimension));

    let state = Arc::new(UpdaterState::new(&config, catalog, embedder)?);
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("semsearch-updater listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
