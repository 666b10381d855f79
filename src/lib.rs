//! Polls a WooCommerce bridge endpoint for open-order status and exposes
//! the result as derived metrics, serving stale data across failed
//! refreshes.

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod metrics;
pub mod types;
pub mod woo_client;

pub use bridge::{restart, start, BridgeHandle};
pub use config::Settings;
pub use coordinator::{RefreshCoordinator, RefreshListener, RefreshState};
pub use metrics::MetricsPublisher;
pub use types::{BridgeError, ConnectFailure, FetchError};
pub use woo_client::{verify_connection, MetricsReport, OrdersFetch, WooClient};
