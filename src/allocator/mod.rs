//! Priority allocation
//!
//! Rules on a listener must carry unique priorities, and the control plane
//! is the only arbiter. A rule created without an explicit priority takes
//! `highest + 1`; if another writer wins that slot first the control plane
//! answers `PriorityInUse` and the whole scan-and-create attempt runs again
//! under a [`RetryPolicy`].
//!
//! # Data Flow
//! ```text
//! CreateRule ──► pinned? ──yes──► create_rule(p) ──► RemoteRule | PriorityInUse
//!                   │
//!                   no
//!                   ▼
//!         ┌─► rule_pages(listener) ──► max(non-default) + 1 = next
//!         │                                           │
//!         │                                 create_rule(next)
//!         │                                           │
//!         └──── PriorityInUse (within budget) ◄───────┤
//!                                                     ▼
//!                                                RemoteRule
//! ```

pub mod policy;
pub mod scan;

pub use policy::{AttemptError, Backoff, RetryError, RetryPolicy};
pub use scan::{highest_priority, rule_pages};

use crate::model::{Action, Condition, MAX_PRIORITY};
use crate::remote::{ControlPlane, CreateRuleRequest, RemoteError, RemoteRule};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A rule ready to be created: already translated to the remote shape.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRule {
    pub listener_arn: String,
    /// Pinned priority; allocated when `None`
    pub priority: Option<u32>,
    pub actions: Vec<Action>,
    pub conditions: Vec<Condition>,
    pub tags: BTreeMap<String, String>,
}

impl CreateRule {
    fn request(&self, priority: u32) -> CreateRuleRequest {
        CreateRuleRequest {
            listener_arn: self.listener_arn.clone(),
            priority,
            actions: self.actions.clone(),
            conditions: self.conditions.clone(),
            tags: self.tags.clone(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// A pinned priority is taken. Never retried.
    #[error("Priority {priority} is already in use on listener {listener_arn}")]
    PriorityInUse { listener_arn: String, priority: u32 },

    #[error("could not allocate a free priority within {budget:?} after {attempts} attempts")]
    ConflictExhausted { attempts: u32, budget: Duration },

    #[error("Listener not found: {0}")]
    ListenerNotFound(String),

    #[error("Listener {listener_arn} has no free priority above {highest}")]
    PriorityRangeExhausted { listener_arn: String, highest: u32 },

    #[error("Priority allocation cancelled")]
    Cancelled,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Creates rules, allocating a free priority when none is pinned.
#[derive(Clone)]
pub struct PriorityAllocator {
    remote: Arc<dyn ControlPlane>,
    policy: RetryPolicy,
}

impl PriorityAllocator {
    pub fn new(remote: Arc<dyn ControlPlane>, policy: RetryPolicy) -> Self {
        Self { remote, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Create `rule`, returning the rule as the control plane stored it.
    ///
    /// - pinned priority: one create; a conflict is `PriorityInUse`
    /// - otherwise: scan, create at `highest + 1`, retry on conflict until
    ///   the policy gives up with `ConflictExhausted`
    pub async fn create(
        &self,
        rule: CreateRule,
        cancel: &CancellationToken,
    ) -> Result<RemoteRule, AllocationError> {
        let result = match rule.priority {
            Some(priority) => self.create_pinned(&rule, priority, cancel).await,
            None => self.create_allocated(&rule, cancel).await,
        };

        let outcome = match &result {
            Ok(_) => "created",
            Err(AllocationError::ConflictExhausted { .. }) => "exhausted",
            Err(AllocationError::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        metrics::counter!("lbrule_allocations_total", "outcome" => outcome).increment(1);
        result
    }

    async fn create_pinned(
        &self,
        rule: &CreateRule,
        priority: u32,
        cancel: &CancellationToken,
    ) -> Result<RemoteRule, AllocationError> {
        if cancel.is_cancelled() {
            return Err(AllocationError::Cancelled);
        }
        let created = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AllocationError::Cancelled),
            created = self.remote.create_rule(rule.request(priority)) => created,
        };
        match created {
            Ok(created) => {
                info!(listener = %rule.listener_arn, priority, rule_arn = %created.rule_arn, "Rule created");
                Ok(created)
            }
            Err(RemoteError::PriorityInUse { priority }) => Err(AllocationError::PriorityInUse {
                listener_arn: rule.listener_arn.clone(),
                priority,
            }),
            Err(RemoteError::NotFound { .. }) => {
                Err(AllocationError::ListenerNotFound(rule.listener_arn.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_allocated(
        &self,
        rule: &CreateRule,
        cancel: &CancellationToken,
    ) -> Result<RemoteRule, AllocationError> {
        let remote = &self.remote;
        let outcome = self
            .policy
            .run(cancel, move |attempt| attempt_once(remote.as_ref(), rule, attempt))
            .await;

        match outcome {
            Ok((created, attempts)) => {
                metrics::histogram!("lbrule_allocation_attempts").record(attempts as f64);
                info!(
                    listener = %rule.listener_arn,
                    priority = %created.priority,
                    rule_arn = %created.rule_arn,
                    attempts,
                    "Rule created at allocated priority"
                );
                Ok(created)
            }
            Err(RetryError::Exhausted { attempts, .. }) => {
                metrics::histogram!("lbrule_allocation_attempts").record(attempts as f64);
                warn!(
                    listener = %rule.listener_arn,
                    attempts,
                    budget_secs = self.policy.budget.as_secs(),
                    "Gave up allocating a priority"
                );
                Err(AllocationError::ConflictExhausted {
                    attempts,
                    budget: self.policy.budget,
                })
            }
            Err(RetryError::Fatal { error, .. }) => Err(error),
            Err(RetryError::Cancelled { attempts }) => {
                debug!(listener = %rule.listener_arn, attempts, "Allocation cancelled");
                Err(AllocationError::Cancelled)
            }
        }
    }
}

/// One scan-and-create attempt.
async fn attempt_once(
    remote: &dyn ControlPlane,
    rule: &CreateRule,
    attempt: u32,
) -> Result<RemoteRule, AttemptError<AllocationError>> {
    let highest = highest_priority(remote, &rule.listener_arn)
        .await
        .map_err(|e| AttemptError::Fatal(scan_error(&rule.listener_arn, e)))?;

    let next = highest + 1;
    if next > MAX_PRIORITY {
        return Err(AttemptError::Fatal(AllocationError::PriorityRangeExhausted {
            listener_arn: rule.listener_arn.clone(),
            highest,
        }));
    }

    debug!(listener = %rule.listener_arn, attempt, priority = next, "Trying priority");
    match remote.create_rule(rule.request(next)).await {
        Ok(created) => Ok(created),
        Err(RemoteError::PriorityInUse { priority }) => {
            metrics::counter!("lbrule_priority_conflicts_total").increment(1);
            debug!(listener = %rule.listener_arn, attempt, priority, "Priority taken, rescanning");
            Err(AttemptError::Retryable(AllocationError::PriorityInUse {
                listener_arn: rule.listener_arn.clone(),
                priority,
            }))
        }
        Err(e) => Err(AttemptError::Fatal(scan_error(&rule.listener_arn, e))),
    }
}

fn scan_error(listener_arn: &str, error: RemoteError) -> AllocationError {
    match error {
        RemoteError::NotFound { .. } => AllocationError::ListenerNotFound(listener_arn.to_string()),
        other => AllocationError::Remote(other),
    }
}
