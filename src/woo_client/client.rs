use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::types::{ConnectFailure, FetchError};

/// Total-request timeout applied to every fetch, connection tests included.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Request header carrying the opaque auth token.
pub const TOKEN_HEADER: &str = "X-HA-Token";

/// Error-body excerpt length kept for diagnostics.
const BODY_EXCERPT_CHARS: usize = 200;

/// One authenticated GET against the order endpoint. The coordinator owns
/// retries (fixed-interval re-polling); the client never retries.
#[async_trait]
pub trait OrdersFetch: Send + Sync {
    async fn fetch_orders(&self) -> Result<Value, FetchError>;
}

#[derive(Clone)]
pub struct WooClient {
    endpoint: String,
    token: String,
    http: Client,
}

impl WooClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|err| FetchError::Unexpected(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            token: settings.token.clone(),
            http,
        })
    }
}

#[async_trait]
impl OrdersFetch for WooClient {
    async fn fetch_orders(&self) -> Result<Value, FetchError> {
        debug!(endpoint = %self.endpoint, "Fetching open orders");

        let response = self
            .http
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(FetchError::Forbidden);
        }
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        response.json::<Value>().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Unexpected(format!("Invalid JSON body: {err}"))
            }
        })
    }
}

fn classify_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() || err.is_request() {
        FetchError::Connection(err.to_string())
    } else {
        FetchError::Unexpected(err.to_string())
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Validate an endpoint/token pair with a single fetch. The body is
/// discarded; only reachability and authorization matter here. Failures
/// collapse into the three operator-facing buckets, with the classified
/// detail logged.
pub async fn verify_connection(settings: &Settings) -> Result<(), ConnectFailure> {
    let client = WooClient::new(settings).map_err(|err| {
        warn!(error = %err, "Connection test could not build a client");
        ConnectFailure::Unknown
    })?;

    match client.fetch_orders().await {
        Ok(_) => Ok(()),
        Err(err) => {
            warn!(endpoint = %settings.endpoint, error = %err, "Connection test failed");
            Err(ConnectFailure::from(&err))
        }
    }
}
