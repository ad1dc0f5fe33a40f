//! Client configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::family::ApiFamily;

/// Upstream protocol generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Entity passed as query parameters, results paginated (`last_page`).
    #[default]
    Paginated,
    /// Entity addressed by URL path, unpaginated, ranges capped at ~30 days.
    PathAddressed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Read(String),

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("api_key must not be empty")]
    MissingApiKey,

    #[error("page_size must be greater than zero")]
    InvalidPageSize,

    #[error("invalid {family} base URL '{url}': {reason}")]
    InvalidBaseUrl {
        family: ApiFamily,
        url: String,
        reason: String,
    },
}

fn default_page_size() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("gie-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_drop_not_applicable() -> bool {
    true
}

/// Settings for a [`GieClient`](crate::client::GieClient).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Sent verbatim in the `x-key` header.
    pub api_key: String,

    #[serde(default)]
    pub protocol: Protocol,

    /// Overrides the gas storage endpoint.
    #[serde(default)]
    pub gas_base_url: Option<String>,

    /// Overrides the LNG endpoint.
    #[serde(default)]
    pub lng_base_url: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Drop rows whose status is `N` (not applicable) during normalization.
    #[serde(default = "default_drop_not_applicable")]
    pub drop_not_applicable: bool,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            protocol: Protocol::default(),
            gas_base_url: None,
            lng_base_url: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            drop_not_applicable: default_drop_not_applicable(),
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_base_url(mut self, family: ApiFamily, url: impl Into<String>) -> Self {
        match family {
            ApiFamily::GasStorage => self.gas_base_url = Some(url.into()),
            ApiFamily::Lng => self.lng_base_url = Some(url.into()),
        }
        self
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        for family in [ApiFamily::GasStorage, ApiFamily::Lng] {
            let url = self.base_url(family);
            url::Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
                family,
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Endpoint for a family: the override if set, else the protocol default.
    pub fn base_url(&self, family: ApiFamily) -> &str {
        let custom = match family {
            ApiFamily::GasStorage => self.gas_base_url.as_deref(),
            ApiFamily::Lng => self.lng_base_url.as_deref(),
        };
        custom.unwrap_or_else(|| family.default_base_url(self.protocol))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("protocol", &self.protocol)
            .field("gas_base_url", &self.gas_base_url)
            .field("lng_base_url", &self.lng_base_url)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("drop_not_applicable", &self.drop_not_applicable)
            .finish()
    }
}
