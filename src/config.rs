use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::types::BridgeError;

pub const DEFAULT_ENDPOINT: &str = "https://jouwdomein.be/wp-json/wp-ha/v1/open-orders";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

const ENV_ENDPOINT: &str = "WOO_BRIDGE_ENDPOINT";
const ENV_TOKEN: &str = "WOO_BRIDGE_TOKEN";
const ENV_POLL_INTERVAL: &str = "WOO_BRIDGE_POLL_INTERVAL";
const ENV_CONFIG_PATH: &str = "WOO_BRIDGE_CONFIG";

/// Settings for one bridge instance. Immutable once a bridge is started;
/// reconfiguration tears the bridge down and starts a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub token: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            token: String::new(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Settings {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, poll_interval: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            poll_interval,
        }
        .normalized()
    }

    /// Load settings from config.json in the app directory, then apply
    /// environment overrides. Falls back to defaults if the file is absent.
    pub async fn load() -> Result<Self, BridgeError> {
        let config_path = get_config_path();

        let mut settings = if config_path.exists() {
            Self::from_file(&config_path).await?
        } else {
            warn!(path = %config_path.display(), "Config file not found, using defaults");
            Self::default()
        };

        settings.apply_env_overrides();
        let settings = settings.normalized();
        settings.validate()?;

        info!(
            endpoint = %settings.endpoint,
            interval_secs = settings.poll_interval,
            "Loaded configuration"
        );
        Ok(settings)
    }

    pub async fn from_file(path: &Path) -> Result<Self, BridgeError> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| BridgeError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| BridgeError::Config(format!("Failed to parse config file: {err}")))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(ENV_ENDPOINT) {
            if !value.trim().is_empty() {
                self.endpoint = value;
            }
        }
        if let Ok(value) = env::var(ENV_TOKEN) {
            if !value.trim().is_empty() {
                self.token = value;
            }
        }
        if let Ok(value) = env::var(ENV_POLL_INTERVAL) {
            match value.trim().parse::<u64>() {
                Ok(secs) => self.poll_interval = secs,
                Err(_) => warn!(value = %value, "Ignoring non-numeric poll interval override"),
            }
        }
    }

    /// Strip the trailing slash off the endpoint and clamp the poll
    /// interval to at least one second.
    pub fn normalized(mut self) -> Self {
        self.endpoint = self.endpoint.trim().trim_end_matches('/').to_string();
        self.token = self.token.trim().to_string();
        self.poll_interval = self.poll_interval.max(1);
        self
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(BridgeError::Config(format!(
                "Endpoint must be an absolute HTTP(S) URL, got {:?}",
                self.endpoint
            )));
        }
        if self.token.is_empty() {
            return Err(BridgeError::Config(
                "Auth token must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }
}

/// Look for config.json next to the executable, falling back to the
/// current directory. `WOO_BRIDGE_CONFIG` overrides the lookup entirely.
fn get_config_path() -> PathBuf {
    if let Ok(custom) = env::var(ENV_CONFIG_PATH) {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        debug!(path = %exe_path.display(), "Executable path detected");
        if let Some(bin_dir) = exe_path.parent() {
            return bin_dir.join("config.json");
        }
    }

    warn!("Using fallback: looking for config.json in current directory");
    PathBuf::from("config.json")
}
