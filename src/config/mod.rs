//! Configuration module for lbrule
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`LBRULE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use lbrule::config::SyncConfig;
//!
//! let toml = r#"
//! [remote]
//! endpoint = "https://lb.internal:8443/v1"
//!
//! [allocator]
//! budget_seconds = 60
//! "#;
//! let config: SyncConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.allocator.budget_seconds, 60);
//! assert_eq!(config.remote.request_timeout_seconds, 30);
//! ```

pub mod allocator;
pub mod error;
pub mod logging;
pub mod remote;

pub use allocator::AllocatorConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use remote::RemoteConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the rule synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Control plane connection
    pub remote: RemoteConfig,
    /// Priority allocation and read-back retry settings
    pub allocator: AllocatorConfig,
    pub logging: LoggingConfig,
}

impl SyncConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports LBRULE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("LBRULE_ENDPOINT") {
            self.remote.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("LBRULE_API_KEY") {
            self.remote.api_key = Some(key);
        }
        if let Ok(timeout) = std::env::var("LBRULE_REQUEST_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.remote.request_timeout_seconds = t;
            }
        }

        if let Ok(budget) = std::env::var("LBRULE_ALLOCATION_BUDGET") {
            if let Ok(b) = budget.parse() {
                self.allocator.budget_seconds = b;
            }
        }

        if let Ok(level) = std::env::var("LBRULE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LBRULE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.remote.validate()?;
        self.allocator.validate()?;
        Ok(())
    }
}
