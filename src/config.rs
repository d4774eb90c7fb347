//! # Store Configuration
//!
//! Loaded from TOML. Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! app_id = "backoffice"
//!
//! [api]
//! base_url = "https://shop.example.com/api/admin"
//! timeout_secs = 30
//!
//! [retry]
//! max_attempts = 3
//! min_delay_ms = 200
//! max_delay_ms = 2000
//!
//! [storage]
//! dir = ".backoffice"
//!
//! [runtime]
//! channel_buffer = 32
//! notification_buffer = 64
//! ```
//!
//! `BACKOFFICE_API_URL` overrides `api.base_url` (see [`StoreConfig::with_env_overrides`]).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "BACKOFFICE_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Namespaces the persisted session key.
    pub app_id: String,
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Request queue capacity of each slice.
    pub channel_buffer: usize,
    /// Notifications kept for slow subscribers.
    pub notification_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            app_id: "backoffice".to_string(),
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
            storage: StorageConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".backoffice"),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 32,
            notification_buffer: 64,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }
        self
    }
}
