//! Control plane abstraction.
//!
//! The [`ControlPlane`] trait is the only way the allocator and reconciler
//! reach the remote load balancer API. [`HttpControlPlane`] speaks JSON over
//! HTTP; tests substitute an in-memory implementation.

use async_trait::async_trait;

pub mod error;
pub mod http;
pub mod types;

pub use error::RemoteError;
pub use http::HttpControlPlane;
pub use types::{CreateRuleRequest, ModifyRuleRequest, RemoteRule, RulePage};

/// Remote operations on listener rules.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn ControlPlane>`.
///
/// # Cancellation Safety
///
/// Dropping any returned future aborts the in-flight request. A create that
/// is dropped mid-flight may still have been applied remotely.
#[async_trait]
pub trait ControlPlane: Send + Sync + 'static {
    /// One page of the listener's rules, default rule included.
    ///
    /// - `Err(RemoteError::NotFound)` if the listener does not exist
    async fn list_rules(
        &self,
        listener_arn: &str,
        page_token: Option<&str>,
    ) -> Result<RulePage, RemoteError>;

    /// Fetch one rule.
    ///
    /// - `Err(RemoteError::NotFound)` if the rule does not exist (or has not
    ///   propagated yet)
    async fn describe_rule(&self, rule_arn: &str) -> Result<RemoteRule, RemoteError>;

    /// Create a rule at an explicit priority.
    ///
    /// - `Err(RemoteError::PriorityInUse)` if another rule holds the priority
    /// - `Err(RemoteError::Validation)` if the contents are rejected
    /// - `Err(RemoteError::NotFound)` if the listener does not exist
    async fn create_rule(&self, request: CreateRuleRequest) -> Result<RemoteRule, RemoteError>;

    /// Replace a rule's actions and/or conditions.
    async fn modify_rule(
        &self,
        rule_arn: &str,
        request: ModifyRuleRequest,
    ) -> Result<RemoteRule, RemoteError>;

    /// Move a rule to another priority.
    ///
    /// - `Err(RemoteError::PriorityInUse)` if another rule holds the priority
    async fn set_rule_priority(&self, rule_arn: &str, priority: u32) -> Result<(), RemoteError>;

    /// Delete a rule.
    ///
    /// - `Err(RemoteError::NotFound)` if the rule is already gone
    async fn delete_rule(&self, rule_arn: &str) -> Result<(), RemoteError>;
}
