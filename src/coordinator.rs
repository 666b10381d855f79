//! Refresh scheduling and result sharing for the order endpoint.
//!
//! One coordinator owns the current snapshot, the last classified error
//! and the subscriber set. Concurrent `refresh()` callers are coalesced:
//! whoever arrives while a fetch is in flight waits for that fetch and
//! reuses its outcome instead of issuing a second request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::types::FetchError;
use crate::woo_client::{MetricsReport, OrdersFetch};

/// What every consumer sees after a refresh completes. A failed refresh
/// keeps the previous snapshot untouched; only `last_error` changes.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    pub snapshot: Option<Arc<Value>>,
    pub last_error: Option<FetchError>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl RefreshState {
    pub fn is_available(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn metrics(&self) -> MetricsReport {
        MetricsReport::from_snapshot(self.snapshot.as_deref(), self.last_refresh)
    }
}

/// Observer notified after every completed refresh, success or failure.
pub trait RefreshListener: Send + Sync {
    fn on_refreshed(&self, state: &RefreshState);
}

pub struct RefreshCoordinator {
    fetcher: Arc<dyn OrdersFetch>,
    state: RwLock<RefreshState>,
    listeners: RwLock<Vec<Arc<dyn RefreshListener>>>,
    // Single-flight: the gate serializes refresh bodies, the generation
    // tells a queued caller that the refresh it waited on already ran.
    gate: Mutex<()>,
    generation: AtomicU64,
}

impl RefreshCoordinator {
    pub fn new(fetcher: Arc<dyn OrdersFetch>) -> Self {
        Self {
            fetcher,
            state: RwLock::new(RefreshState::default()),
            listeners: RwLock::new(Vec::new()),
            gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Current state, cloned. The snapshot is shared by `Arc`, so this is
    /// cheap and readers never observe a partially replaced payload.
    pub async fn state(&self) -> RefreshState {
        self.state.read().await.clone()
    }

    /// Register a listener and bring it up to date with the current state.
    pub async fn subscribe(&self, listener: Arc<dyn RefreshListener>) {
        listener.on_refreshed(&self.state().await);
        self.listeners.write().await.push(listener);
    }

    /// Run one refresh, or piggyback on the refresh already in flight.
    /// Every caller gets the state produced by the refresh it observed.
    pub async fn refresh(&self) -> RefreshState {
        let seen = self.generation.load(Ordering::Acquire);
        let _gate = self.gate.lock().await;
        if self.generation.load(Ordering::Acquire) != seen {
            // A refresh completed while we waited for the gate.
            return self.state().await;
        }

        let result = self.fetcher.fetch_orders().await;
        let state = self.record(result).await;
        self.generation.fetch_add(1, Ordering::Release);
        self.notify(&state).await;
        state
    }

    /// The mandatory first refresh: a failure here is a hard setup error
    /// rather than a recorded `last_error`.
    pub async fn first_refresh(&self) -> Result<RefreshState, FetchError> {
        let state = self.refresh().await;
        match state.last_error.clone() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }

    async fn record(&self, result: Result<Value, FetchError>) -> RefreshState {
        let mut state = self.state.write().await;
        match result {
            Ok(payload) => {
                state.snapshot = Some(Arc::new(payload));
                state.last_error = None;
                state.last_refresh = Some(Utc::now());
                debug!("Refresh succeeded");
            }
            Err(err) => {
                warn!(error = %err, stale_data = state.snapshot.is_some(), "Refresh failed");
                state.last_error = Some(err);
            }
        }
        state.clone()
    }

    async fn notify(&self, state: &RefreshState) {
        let listeners = self.listeners.read().await;
        for listener in listeners.iter() {
            listener.on_refreshed(state);
        }
    }
}
