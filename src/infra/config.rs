//! Client configuration.
//!
//! Holds the service endpoint, relying-party identity, and timing parameters
//! shared by all operations. Supports loading from a TOML file so deployments
//! can keep relying-party credentials out of code.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infra::error::{RemoteIdError, RemoteIdResult};

fn default_network_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    1_000
}

/// Configuration for a remote identity service client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the identity service API (e.g. `https://rp-api.example.com/v2`)
    pub service_url: String,

    /// UUID assigned to the relying party by the service operator
    pub relying_party_uuid: String,

    /// Name the relying party registered with the service operator; shown to
    /// the end user on their device
    pub relying_party_name: String,

    /// Per-request network timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub network_timeout_seconds: u64,

    /// Sleep between consecutive session status polls, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_millis: u64,

    /// Long-poll duration the service may hold a status response open for,
    /// in milliseconds; `None` disables long polling
    #[serde(default)]
    pub long_poll_timeout_millis: Option<u64>,
}

impl ClientConfig {
    /// Create a configuration with default timing parameters.
    pub fn new(
        service_url: impl Into<String>,
        relying_party_uuid: impl Into<String>,
        relying_party_name: impl Into<String>,
    ) -> Self {
        Self {
            service_url: service_url.into(),
            relying_party_uuid: relying_party_uuid.into(),
            relying_party_name: relying_party_name.into(),
            network_timeout_seconds: default_network_timeout(),
            poll_interval_millis: default_poll_interval(),
            long_poll_timeout_millis: None,
        }
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> RemoteIdResult<Self> {
        let path = path.as_ref();
        log::info!("Loading client configuration from: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            RemoteIdError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: ClientConfig = toml::from_str(&content).map_err(|e| {
            RemoteIdError::Configuration(format!("Failed to parse config file: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> RemoteIdResult<()> {
        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://") {
            return Err(RemoteIdError::Configuration(format!(
                "Service URL must start with http:// or https://, got: {}",
                self.service_url
            )));
        }

        if self.relying_party_uuid.is_empty() {
            return Err(RemoteIdError::Configuration(
                "Parameter relyingPartyUUID must be set".to_string(),
            ));
        }

        if self.relying_party_name.is_empty() {
            return Err(RemoteIdError::Configuration(
                "Parameter relyingPartyName must be set".to_string(),
            ));
        }

        if self.network_timeout_seconds == 0 {
            return Err(RemoteIdError::Configuration(
                "Network timeout must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_millis == 0 {
            return Err(RemoteIdError::Configuration(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Network timeout as a [`Duration`].
    #[must_use]
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_seconds)
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    /// Long-poll timeout as a [`Duration`], when configured.
    #[must_use]
    pub fn long_poll_timeout(&self) -> Option<Duration> {
        self.long_poll_timeout_millis.map(Duration::from_millis)
    }
}
