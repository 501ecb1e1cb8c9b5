//! Errors raised while loading or checking `lbrule.toml`

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// `remote.endpoint` is not an absolute http(s) URL.
    #[error("Invalid remote endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Invalid remote setting '{field}': {message}")]
    InvalidRemoteSetting {
        field: &'static str,
        message: String,
    },

    /// Conflict retry budget or backoff bounds that cannot produce a schedule.
    #[error("Invalid allocator retry setting '{field}': {message}")]
    InvalidRetrySettings {
        field: &'static str,
        message: String,
    },

    #[error("API key variable {var} is not set")]
    ApiKeyUnset { var: String },
}
