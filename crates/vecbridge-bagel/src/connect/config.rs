//! BagelDB client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use url::Url;

use crate::error::{Error, Result};

/// Transport protocol used to reach the BagelDB server.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display,
)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

/// Configuration for the BagelDB client.
///
/// Defaults point at the hosted service, `http://api.bageldb.ai:80`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct BagelConfig {
    /// Protocol used to reach the server
    #[cfg_attr(
        feature = "config",
        arg(
            long = "bagel-protocol",
            env = "BAGEL_PROTOCOL",
            value_enum,
            default_value = "http"
        )
    )]
    #[serde(default)]
    pub protocol: Protocol,

    /// BagelDB server host (e.g., "api.bageldb.ai")
    #[cfg_attr(
        feature = "config",
        arg(long = "bagel-host", env = "BAGEL_HOST", default_value = "api.bageldb.ai")
    )]
    #[serde(default = "default_host")]
    pub host: String,

    /// BagelDB server port
    #[cfg_attr(
        feature = "config",
        arg(long = "bagel-port", env = "BAGEL_PORT", default_value = "80")
    )]
    #[serde(default = "default_port")]
    pub port: u16,

    /// API key sent as `X-API-Key`
    #[cfg_attr(feature = "config", arg(long = "bagel-api-key", env = "BAGEL_API_KEY"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "bagel-timeout", env = "BAGEL_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "api.bageldb.ai".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BagelConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            host: default_host(),
            port: default_port(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BagelConfig {
    /// Create a new configuration with host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Set the protocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the server URL, without the API prefix.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Returns the base URL of the REST API.
    pub fn api_url(&self) -> Result<Url> {
        let url = Url::parse(&format!("{}/api/v1", self.url()))?;
        Ok(url)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::invalid_config("host must not be empty"));
        }

        if self.port == 0 {
            return Err(Error::invalid_config("port must be greater than 0"));
        }

        if self.timeout_secs == 0 {
            return Err(Error::invalid_config("timeout must be greater than 0"));
        }

        if self.api_key.as_deref().is_some_and(str::is_empty) {
            return Err(Error::invalid_config("API key must not be empty when set"));
        }

        Ok(())
    }
}
