//! Error types for control plane operations.

use thiserror::Error;

/// Errors returned by a [`ControlPlane`](super::ControlPlane).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Another rule on the listener already holds this priority.
    #[error("Priority {priority} is already in use")]
    PriorityInUse { priority: u32 },

    /// Listener or rule does not exist.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The control plane rejected the request contents.
    #[error("Rejected by control plane: {0}")]
    Validation(String),

    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Control plane returned an unexpected error response.
    #[error("Control plane error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be constructed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RemoteError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        RemoteError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound { .. })
    }

    pub fn is_priority_in_use(&self) -> bool {
        matches!(self, RemoteError::PriorityInUse { .. })
    }
}
