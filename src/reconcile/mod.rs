//! Rule lifecycle orchestration
//!
//! [`RuleReconciler`] wires translation, priority allocation, relevance
//! diffing and the control plane into the four lifecycle operations.
//!
//! # Data Flow
//! ```text
//! create:  RuleSpec ─► expand_rule ─► PriorityAllocator ─► describe (until visible) ─► RuleState
//! read:    describe ─► flatten (+ prior passthrough) ─► RuleState | None
//! update:  RuleSpec ─► expand_rule ─► read ─► plan_changes ─► set_rule_priority? ─► modify_rule? ─► read
//! delete:  delete_rule (NotFound is success)
//! ```
//!
//! Every operation runs in a span tagged with a fresh `operation_id`.

pub mod error;

pub use error::SyncError;

use crate::allocator::{
    rule_pages, AllocationError, AttemptError, CreateRule, PriorityAllocator, RetryError,
    RetryPolicy,
};
use crate::config::AllocatorConfig;
use crate::logging::{action_summary, changed_paths, condition_summary, generate_operation_id};
use crate::model::{listener_arn_from_rule_arn, Priority, RuleSpec};
use crate::relevance::{plan_changes, RelevanceGate, RuleChanges};
use crate::remote::{ControlPlane, ModifyRuleRequest, RemoteError, RemoteRule};
use crate::translate::{expand_rule, flatten_actions, flatten_conditions, Passthrough};
use futures_util::TryStreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

/// Paths listed in the update log line before truncating.
const LOGGED_PATHS: usize = 8;

/// A remote rule in declared shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleState {
    pub rule_arn: String,
    pub listener_arn: String,
    pub priority: Priority,
    pub is_default: bool,
    pub spec: RuleSpec,
}

impl RuleState {
    /// Flatten a remote rule. `prior` supplies values the control plane
    /// never returns (OIDC client secrets, forward shortcuts, tags).
    pub fn from_remote(remote: RemoteRule, prior: Option<&RuleSpec>) -> Result<Self, SyncError> {
        let listener_arn = match remote.listener_arn {
            Some(listener_arn) => listener_arn,
            None => listener_arn_from_rule_arn(&remote.rule_arn).ok_or_else(|| {
                RemoteError::InvalidResponse(format!(
                    "cannot derive a listener from rule ARN '{}'",
                    remote.rule_arn
                ))
            })?,
        };
        let passthrough = prior
            .map(|spec| Passthrough::from_declared(&spec.actions))
            .unwrap_or_default();

        let spec = RuleSpec {
            listener_arn: listener_arn.clone(),
            priority: remote.priority.value(),
            actions: flatten_actions(remote.actions, &passthrough),
            conditions: flatten_conditions(remote.conditions),
            tags: prior.map(|spec| spec.tags.clone()).unwrap_or_default(),
        };

        Ok(Self {
            rule_arn: remote.rule_arn,
            listener_arn,
            priority: remote.priority,
            is_default: remote.is_default,
            spec,
        })
    }
}

/// Current state of a rule and what an update would change.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub current: RuleState,
    pub changes: RuleChanges,
}

/// Drives rules through create / read / update / delete.
pub struct RuleReconciler {
    remote: Arc<dyn ControlPlane>,
    allocator: PriorityAllocator,
    read_policy: RetryPolicy,
    gate: RelevanceGate,
}

impl RuleReconciler {
    pub fn new(remote: Arc<dyn ControlPlane>, config: &AllocatorConfig) -> Self {
        Self::with_policies(remote, config.retry_policy(), config.read_policy())
    }

    pub fn with_policies(
        remote: Arc<dyn ControlPlane>,
        allocation: RetryPolicy,
        read: RetryPolicy,
    ) -> Self {
        Self {
            allocator: PriorityAllocator::new(remote.clone(), allocation),
            remote,
            read_policy: read,
            gate: RelevanceGate::for_rules(),
        }
    }

    /// Create the rule, allocating a priority unless one is declared, and
    /// return it as read back from the control plane.
    pub async fn create(
        &self,
        spec: &RuleSpec,
        cancel: &CancellationToken,
    ) -> Result<RuleState, SyncError> {
        let span = info_span!(
            "create_rule",
            operation_id = %generate_operation_id(),
            listener = %spec.listener_arn
        );
        async move {
            let (actions, conditions) = expand_rule(spec)?;
            debug!(
                actions = %action_summary(&actions),
                conditions = %condition_summary(&conditions),
                pinned = ?spec.priority,
                "Rule translated"
            );

            let created = self
                .allocator
                .create(
                    CreateRule {
                        listener_arn: spec.listener_arn.clone(),
                        priority: spec.priority,
                        actions,
                        conditions,
                        tags: spec.tags.clone(),
                    },
                    cancel,
                )
                .await?;

            self.read_after_create(&created.rule_arn, spec, cancel).await
        }
        .instrument(span)
        .await
    }

    /// A new rule may not be visible to reads right away; retry `NotFound`
    /// under the read policy.
    async fn read_after_create(
        &self,
        rule_arn: &str,
        spec: &RuleSpec,
        cancel: &CancellationToken,
    ) -> Result<RuleState, SyncError> {
        let remote = &self.remote;
        let result = self
            .read_policy
            .run(cancel, move |attempt| async move {
                match remote.describe_rule(rule_arn).await {
                    Ok(rule) => Ok(rule),
                    Err(e) if e.is_not_found() => {
                        debug!(rule_arn, attempt, "Created rule not visible yet");
                        Err(AttemptError::Retryable(e))
                    }
                    Err(e) => Err(AttemptError::Fatal(e)),
                }
            })
            .await;

        match result {
            Ok((rule, _)) => RuleState::from_remote(rule, Some(spec)),
            Err(RetryError::Exhausted { last, .. }) | Err(RetryError::Fatal { error: last, .. }) => {
                Err(last.into())
            }
            Err(RetryError::Cancelled { .. }) => Err(AllocationError::Cancelled.into()),
        }
    }

    /// Read a rule. A missing rule is `Ok(None)`, not an error.
    pub async fn read(
        &self,
        rule_arn: &str,
        prior: Option<&RuleSpec>,
    ) -> Result<Option<RuleState>, SyncError> {
        match self.remote.describe_rule(rule_arn).await {
            Ok(rule) => RuleState::from_remote(rule, prior).map(Some),
            Err(e) if e.is_not_found() => {
                info!(rule_arn, "Rule no longer exists");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Compare the declared rule with the remote one.
    pub async fn plan(&self, rule_arn: &str, desired: &RuleSpec) -> Result<Plan, SyncError> {
        let current = self
            .read(rule_arn, Some(desired))
            .await?
            .ok_or_else(|| SyncError::NotFound(rule_arn.to_string()))?;
        let changes = plan_changes(desired, &current.spec, &self.gate);
        Ok(Plan { current, changes })
    }

    /// Bring the remote rule in line with `desired`, touching only what
    /// changed.
    pub async fn update(&self, rule_arn: &str, desired: &RuleSpec) -> Result<RuleState, SyncError> {
        let span = info_span!(
            "update_rule",
            operation_id = %generate_operation_id(),
            rule_arn = %rule_arn
        );
        async move {
            let (actions, conditions) = expand_rule(desired)?;
            let Plan { current, changes } = self.plan(rule_arn, desired).await?;

            if changes.listener_changed {
                return Err(SyncError::ImmutableField {
                    field: "listener_arn",
                    current: current.listener_arn,
                    desired: desired.listener_arn.clone(),
                });
            }
            if changes.is_empty() {
                info!("Rule is up to date");
                return Ok(current);
            }
            info!(
                priority = ?changes.priority,
                actions = changes.actions,
                conditions = changes.conditions,
                paths = %changed_paths(&changes.paths, LOGGED_PATHS),
                "Updating rule"
            );

            if let Some(priority) = changes.priority {
                self.remote
                    .set_rule_priority(rule_arn, priority)
                    .await
                    .map_err(|e| match e {
                        RemoteError::PriorityInUse { priority } => {
                            SyncError::Allocation(AllocationError::PriorityInUse {
                                listener_arn: current.listener_arn.clone(),
                                priority,
                            })
                        }
                        other => other.into(),
                    })?;
            }

            let request = ModifyRuleRequest {
                actions: changes.actions.then_some(actions),
                conditions: changes.conditions.then_some(conditions),
            };
            if !request.is_empty() {
                self.remote.modify_rule(rule_arn, request).await?;
            }

            self.read(rule_arn, Some(desired))
                .await?
                .ok_or_else(|| SyncError::NotFound(rule_arn.to_string()))
        }
        .instrument(span)
        .await
    }

    /// Delete a rule. Deleting a rule that is already gone succeeds.
    pub async fn delete(&self, rule_arn: &str) -> Result<(), SyncError> {
        let span = info_span!(
            "delete_rule",
            operation_id = %generate_operation_id(),
            rule_arn = %rule_arn
        );
        async move {
            match self.remote.delete_rule(rule_arn).await {
                Ok(()) => {
                    info!("Rule deleted");
                    Ok(())
                }
                Err(e) if e.is_not_found() => {
                    info!("Rule already deleted");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
        .instrument(span)
        .await
    }

    /// Every rule on a listener, default rule included.
    pub async fn list(&self, listener_arn: &str) -> Result<Vec<RemoteRule>, SyncError> {
        let pages: Vec<_> = rule_pages(self.remote.as_ref(), listener_arn)
            .try_collect()
            .await?;
        let mut rules: Vec<RemoteRule> = pages.into_iter().flat_map(|page| page.rules).collect();
        rules.sort_by_key(|rule| rule.priority);
        Ok(rules)
    }
}
