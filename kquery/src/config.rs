//! Connection settings for [`QueryClient`](crate::QueryClient).
//!
//! Settings can be built in code or read from a TOML file:
//!
//! ```toml
//! host = "http://localhost:9200"
//! timeout_ms = 30000
//! index = "df-dlfw-trtis-benchmarks-*"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Index pattern queried when none is configured.
pub const DEFAULT_INDEX: &str = "df-dlfw-trtis-benchmarks-*";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the cluster, optionally with a path prefix
    /// (e.g. behind a reverse proxy).
    #[serde(default = "default_host")]
    pub host: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Index name or pattern used in `FROM` and in the existence check.
    #[serde(default = "default_index")]
    pub index: String,
}

fn default_host() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout_ms() -> u64 {
    1_000_000
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            timeout_ms: default_timeout_ms(),
            index: default_index(),
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, timeout_ms: u64, index: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            timeout_ms,
            index: index.into(),
        }
    }

    /// Load config from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.host)?;
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than 0".into()));
        }
        if self.index.trim().is_empty() {
            return Err(Error::Config("index must not be empty".into()));
        }
        Ok(())
    }
}
