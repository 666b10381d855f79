use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::coordinator::{RefreshListener, RefreshState};
use crate::woo_client::MetricsReport;

/// Keeps the two derived metrics current after every refresh and logs
/// value transitions. Consumers read [`MetricsPublisher::latest`] instead
/// of touching the coordinator directly.
pub struct MetricsPublisher {
    latest: RwLock<MetricsReport>,
}

impl MetricsPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            latest: RwLock::new(MetricsReport::from_snapshot(None, None)),
        })
    }

    pub fn latest(&self) -> MetricsReport {
        match self.latest.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RefreshListener for MetricsPublisher {
    fn on_refreshed(&self, state: &RefreshState) {
        let report = state.metrics();

        if let Some(err) = &state.last_error {
            warn!(
                error = %err,
                stale_data = report.available,
                "Refresh completed with failure"
            );
        }

        let mut latest = match self.latest.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if latest.open_orders.value != report.open_orders.value
            || latest.latest_order.value != report.latest_order.value
        {
            info!(
                open_orders = report.open_orders.value,
                latest_order = %report.latest_order.value,
                "Order metrics updated"
            );
        }
        *latest = report;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FetchError;
    use serde_json::json;

    #[test]
    fn starts_unavailable() {
        let publisher = MetricsPublisher::new();
        assert!(!publisher.latest().available);
    }

    #[test]
    fn publishes_metrics_from_state() {
        let publisher = MetricsPublisher::new();
        let state = RefreshState {
            snapshot: Some(Arc::new(json!({
                "count": 4,
                "latest": {"number": "B2001"}
            }))),
            last_error: None,
            last_refresh: None,
        };

        publisher.on_refreshed(&state);
        let report = publisher.latest();
        assert!(report.available);
        assert_eq!(report.open_orders.value, 4);
        assert_eq!(report.latest_order.value, "B2001");
    }

    #[test]
    fn failed_refresh_keeps_serving_stale_metrics() {
        let publisher = MetricsPublisher::new();
        let snapshot = Arc::new(json!({"count": 4}));

        publisher.on_refreshed(&RefreshState {
            snapshot: Some(Arc::clone(&snapshot)),
            last_error: None,
            last_refresh: None,
        });
        publisher.on_refreshed(&RefreshState {
            snapshot: Some(snapshot),
            last_error: Some(FetchError::Timeout),
            last_refresh: None,
        });

        let report = publisher.latest();
        assert!(report.available);
        assert_eq!(report.open_orders.value, 4);
    }
}
