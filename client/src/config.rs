//! Client configuration
//!
//! Loaded the same way as the server configuration:
//! 1. Default values (in code)
//! 2. `config/client.{RUST_ENV}.toml`
//! 3. Environment variables (prefix: FFC__)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server origin, without the `/api` suffix
    pub api_base_url: String,
    /// SQLite file backing the local mirror
    pub database_path: PathBuf,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How often the pending-sync flag is refreshed from the queue
    pub poll_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
        }
    }
}

/// Online read cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub stale_time_secs: u64,
    pub max_entries: usize,
    /// How often expired entries are swept out
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: 300,
            max_entries: 500,
            cleanup_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            database_path: PathBuf::from("fitforge.db"),
            sync: SyncConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/client.{}.toml", env);

        let defaults = config::Config::try_from(&ClientConfig::default())?;
        config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g. FFC__SYNC__POLL_INTERVAL_SECS=10
            .add_source(config::Environment::with_prefix("FFC").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.sync.poll_interval_secs)
    }

}
