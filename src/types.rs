use thiserror::Error;

/// Classified failure of a single fetch against the order endpoint.
///
/// Every failure mode of [`crate::woo_client::WooClient`] maps onto exactly
/// one of these variants; nothing unclassified escapes the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("forbidden: token rejected by endpoint")]
    Forbidden,

    #[error("timeout contacting order endpoint")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse outcome bucket shown to the operator when a connection test
/// fails during setup or reconfiguration. Fine-grained detail is logged,
/// not surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectFailure {
    #[error("forbidden")]
    Forbidden,

    #[error("cannot_connect")]
    CannotConnect,

    #[error("unknown")]
    Unknown,
}

impl From<&FetchError> for ConnectFailure {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::Forbidden => ConnectFailure::Forbidden,
            FetchError::Timeout | FetchError::Connection(_) | FetchError::Http { .. } => {
                ConnectFailure::CannotConnect
            }
            FetchError::Unexpected(_) => ConnectFailure::Unknown,
        }
    }
}

/// Errors that abort bridge startup or configuration handling.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("connection test failed: {0}")]
    ConnectionTest(ConnectFailure),

    #[error("initial refresh failed: {0}")]
    FirstRefresh(#[source] FetchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
