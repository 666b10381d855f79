mod client;
mod model;

pub use client::{verify_connection, OrdersFetch, WooClient, FETCH_TIMEOUT, TOKEN_HEADER};
pub use model::{LatestOrderMetric, MetricsReport, OpenOrdersMetric, LATEST_NONE, LATEST_UNKNOWN};
