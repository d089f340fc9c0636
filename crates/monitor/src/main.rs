//! DEX arbitrage monitor
//!
//! Main entry point

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dexarb_chain::ProviderClient;
use dexarb_monitor::{load_settings, PriceMonitor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();

    info!("Starting dexarb monitor v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let path = env::var("DEXARB_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let settings = load_settings(&path)?;
    info!(
        chain = ?settings.chain,
        local = settings.network.is_local,
        "Loaded {} vs {} from {}",
        settings.venue_a,
        settings.venue_b,
        path
    );

    let client = Arc::new(ProviderClient::from_config(&settings.network).await?);
    let monitor = PriceMonitor::new(client, &settings).await?;

    // Setup shutdown channel
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    error!("Failed to install signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C");
            }
            _ = terminate => {
                info!("Received termination signal");
            }
        }

        let _ = shutdown_tx.send(());
    });

    info!("Press Ctrl+C to shutdown");
    monitor
        .run(Duration::from_millis(settings.monitor.poll_interval_ms), shutdown_rx)
        .await;

    info!("Shutdown complete");
    Ok(())
}
