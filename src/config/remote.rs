//! Control plane connection settings

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// `[remote]` section.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the control plane API
    pub endpoint: String,
    /// Bearer token; prefer `api_key_env` outside of local testing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    pub request_timeout_seconds: u64,
    /// Rules requested per page when scanning a listener
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8443".to_string(),
            api_key: None,
            api_key_env: None,
            request_timeout_seconds: 30,
            page_size: None,
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl RemoteConfig {
    /// Bearer token to send: `api_key` first, then the `api_key_env` variable.
    pub fn resolve_api_key(&self) -> Result<Option<String>, ConfigError> {
        if let Some(key) = &self.api_key {
            return Ok(Some(key.clone()));
        }
        match &self.api_key_env {
            Some(var) => std::env::var(var)
                .map(Some)
                .map_err(|_| ConfigError::ApiKeyUnset { var: var.clone() }),
            None => Ok(None),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let invalid_endpoint = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason,
        };
        if self.endpoint.trim().is_empty() {
            return Err(invalid_endpoint("endpoint cannot be empty".to_string()));
        }
        let url =
            reqwest::Url::parse(&self.endpoint).map_err(|e| invalid_endpoint(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid_endpoint(format!(
                "unsupported scheme '{}', expected http or https",
                url.scheme()
            )));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidRemoteSetting {
                field: "remote.request_timeout_seconds",
                message: "timeout must be non-zero".to_string(),
            });
        }
        if self.page_size == Some(0) {
            return Err(ConfigError::InvalidRemoteSetting {
                field: "remote.page_size",
                message: "page size must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
