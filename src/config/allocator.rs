//! Priority allocation settings

use super::ConfigError;
use crate::allocator::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff between read-back attempts while a new rule propagates.
const READ_BACKOFF_BASE: Duration = Duration::from_millis(250);
const READ_BACKOFF_MAX: Duration = Duration::from_secs(5);

/// `[allocator]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AllocatorConfig {
    /// How long to keep retrying priority conflicts
    pub budget_seconds: u64,
    /// Make one more attempt after the budget runs out
    pub final_attempt: bool,
    /// Base delay between conflict retries; 0 retries immediately
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// How long a freshly created rule may stay invisible to reads
    pub read_propagation_seconds: u64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            budget_seconds: 300,
            final_attempt: true,
            backoff_base_ms: 0,
            backoff_max_ms: 2000,
            read_propagation_seconds: 120,
        }
    }
}

impl AllocatorConfig {
    /// Policy for the scan-and-create loop.
    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy {
            budget: Duration::from_secs(self.budget_seconds),
            final_attempt: self.final_attempt,
            backoff: None,
        };
        if self.backoff_base_ms > 0 {
            policy.with_backoff(
                Duration::from_millis(self.backoff_base_ms),
                Duration::from_millis(self.backoff_max_ms),
            )
        } else {
            policy
        }
    }

    /// Policy for reading a rule back right after it was created.
    pub fn read_policy(&self) -> RetryPolicy {
        RetryPolicy::new(Duration::from_secs(self.read_propagation_seconds))
            .without_final_attempt()
            .with_backoff(READ_BACKOFF_BASE, READ_BACKOFF_MAX)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.backoff_base_ms > self.backoff_max_ms {
            return Err(ConfigError::InvalidRetrySettings {
                field: "allocator.backoff_base_ms",
                message: format!(
                    "base delay {}ms exceeds backoff_max_ms {}ms",
                    self.backoff_base_ms, self.backoff_max_ms
                ),
            });
        }
        Ok(())
    }
}
