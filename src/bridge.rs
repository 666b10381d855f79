//! Explicit start/stop lifecycle around one coordinator instance.
//!
//! `start` performs the mandatory first refresh before handing back a
//! handle; a failure there aborts startup. Reconfiguration is a full
//! teardown plus `start` with the new settings.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Settings;
use crate::coordinator::{RefreshCoordinator, RefreshListener};
use crate::types::BridgeError;
use crate::woo_client::{OrdersFetch, WooClient};

pub struct BridgeHandle {
    coordinator: Arc<RefreshCoordinator>,
    shutdown_tx: watch::Sender<bool>,
    poll_task: JoinHandle<()>,
}

impl std::fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandle").finish_non_exhaustive()
    }
}

/// Start a bridge against the configured endpoint.
pub async fn start(settings: Settings) -> Result<BridgeHandle, BridgeError> {
    settings.validate()?;
    let client = WooClient::new(&settings)
        .map_err(|err| BridgeError::Config(format!("Failed to set up HTTP client: {err}")))?;
    start_with_fetcher(&settings, Arc::new(client)).await
}

/// Same as [`start`], with the fetch seam injectable.
pub async fn start_with_fetcher(
    settings: &Settings,
    fetcher: Arc<dyn OrdersFetch>,
) -> Result<BridgeHandle, BridgeError> {
    let coordinator = Arc::new(RefreshCoordinator::new(fetcher));

    coordinator
        .first_refresh()
        .await
        .map_err(BridgeError::FirstRefresh)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll_task = tokio::spawn(run_poll_loop(
        Arc::clone(&coordinator),
        settings.poll_interval(),
        shutdown_rx,
    ));

    info!(
        endpoint = %settings.endpoint,
        interval_secs = settings.poll_interval,
        "Bridge started"
    );
    Ok(BridgeHandle {
        coordinator,
        shutdown_tx,
        poll_task,
    })
}

/// Tear one bridge down and bring a new one up with fresh settings.
pub async fn restart(handle: BridgeHandle, settings: Settings) -> Result<BridgeHandle, BridgeError> {
    handle.stop().await;
    start(settings).await
}

// Each wait starts after the previous refresh completed, so a slow fetch
// pushes the next one out instead of bunching up.
async fn run_poll_loop(
    coordinator: Arc<RefreshCoordinator>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                coordinator.refresh().await;
            }
            _ = shutdown_rx.changed() => {
                debug!("Poll loop stopping");
                break;
            }
        }
    }
}

impl BridgeHandle {
    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Register a listener; it is brought up to date right away.
    pub async fn subscribe(&self, listener: Arc<dyn RefreshListener>) {
        self.coordinator.subscribe(listener).await;
    }

    /// Cancel the poll timer and wait for the loop to exit. An in-flight
    /// refresh finishes first; its result dies with the coordinator.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.poll_task.await;
        info!("Bridge stopped");
    }
}
