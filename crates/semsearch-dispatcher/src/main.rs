mod config;
mod dispatcher;
mod stdin_source;

use std::time::Duration;

use semsearch_core::logging::init_logging;

use config::Config;
use dispatcher::Dispatcher;
use stdin_source::StdinEventSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    init_logging("logs", "dispatcher.log", "info")?;
    tracing::info!(
        "starting semsearch-dispatcher, targeting updater at {}",
        config.updater_base_url
    );

    let source = StdinEventSource::new();
    let dispatcher = Dispatcher::new(
        source,
        config.updater_base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received ctrl-c, signaling dispatcher shutdown");
        let _ = shutdown_tx.send(true);
    });

    dispatcher.run(shutdown_rx).await;
    Ok(())
}
