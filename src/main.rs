use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use woo_bridge_monitor::{bridge, verify_connection, BridgeError, MetricsPublisher, Settings};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        error!(error = %err, "Bridge failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BridgeError> {
    let settings = Settings::load().await?;

    verify_connection(&settings)
        .await
        .map_err(BridgeError::ConnectionTest)?;

    let handle = bridge::start(settings).await?;
    let publisher = MetricsPublisher::new();
    handle.subscribe(publisher).await;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    handle.stop().await;
    Ok(())
}
