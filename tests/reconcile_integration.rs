//! Rule lifecycle against the in-memory control plane.

mod common;

use common::{
    forward_rule, oidc_config, oidc_rule, InMemoryControlPlane, CLIENT_SECRET, LISTENER,
    OTHER_LISTENER, TARGET_GROUP,
};
use lbrule::allocator::{AllocationError, RetryPolicy};
use lbrule::model::{
    ActionPayload, DeclaredAction, DeclaredCondition, RedirectConfig, RedirectStatus,
};
use lbrule::reconcile::{RuleReconciler, SyncError};
use lbrule::remote::RemoteError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn reconciler(plane: &Arc<InMemoryControlPlane>) -> RuleReconciler {
    RuleReconciler::with_policies(
        plane.clone(),
        RetryPolicy::default(),
        RetryPolicy::new(Duration::from_secs(5)).without_final_attempt(),
    )
}

fn listener_plane() -> Arc<InMemoryControlPlane> {
    Arc::new(InMemoryControlPlane::new().with_listener(LISTENER))
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_allocates_and_reads_back() {
    let plane = listener_plane();
    let state = reconciler(&plane)
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(state.priority.value(), Some(1));
    assert_eq!(state.listener_arn, LISTENER);
    assert_eq!(state.spec.actions[0].target_group_arn, TARGET_GROUP);
    assert_eq!(state.spec.conditions, forward_rule(LISTENER).conditions);
    assert_eq!(plane.creates().len(), 1);
}

#[tokio::test]
async fn test_create_with_declared_priority() {
    let plane = listener_plane();
    let mut spec = forward_rule(LISTENER);
    spec.priority = Some(250);

    let state = reconciler(&plane)
        .create(&spec, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(state.spec.priority, Some(250));
    assert_eq!(plane.attempted_priorities(), vec![250]);
}

#[tokio::test]
async fn test_create_waits_for_propagation() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_hidden_reads(3),
    );
    let state = reconciler(&plane)
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(state.priority.value(), Some(1));
}

#[tokio::test]
async fn test_create_gives_up_when_rule_never_appears() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_hidden_reads(u32::MAX),
    );
    let reconciler = RuleReconciler::with_policies(
        plane.clone(),
        RetryPolicy::default(),
        RetryPolicy::new(Duration::ZERO).without_final_attempt(),
    );

    let err = reconciler
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Remote(RemoteError::NotFound { .. })));
}

#[tokio::test]
async fn test_invalid_rule_sends_nothing() {
    let plane = listener_plane();
    let mut spec = forward_rule(LISTENER);
    spec.actions[0].target_group_arn.clear();
    spec.priority = Some(0);

    let err = reconciler(&plane)
        .create(&spec, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        SyncError::Validation(errors) => assert_eq!(errors.len(), 2),
        other => panic!("Expected Validation, got {:?}", other),
    }
    assert!(plane.attempted_priorities().is_empty());
}

// =============================================================================
// OIDC client secret
// =============================================================================

#[tokio::test]
async fn test_client_secret_is_sent_and_carried_forward() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);
    let spec = oidc_rule(LISTENER);

    let state = reconciler
        .create(&spec, &CancellationToken::new())
        .await
        .unwrap();

    let sent = &plane.creates()[0].actions[0].payload;
    match sent {
        ActionPayload::AuthenticateOidc(oidc) => assert_eq!(oidc.client_secret, CLIENT_SECRET),
        other => panic!("Expected OIDC action, got {:?}", other),
    }
    let carried = state.spec.actions[0].authenticate_oidc.as_ref().unwrap();
    assert_eq!(carried.client_secret, CLIENT_SECRET);

    // Without the prior declaration the secret is unknown.
    let fresh = reconciler.read(&state.rule_arn, None).await.unwrap().unwrap();
    assert_eq!(fresh.spec.actions[0].authenticate_oidc.as_ref().unwrap().client_secret, "");

    // Re-applying the same declaration is not drift.
    reconciler.update(&state.rule_arn, &spec).await.unwrap();
    assert!(plane.modifies().is_empty());
}

#[tokio::test]
async fn test_passthrough_survives_explicit_orders() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);

    let mut spec = forward_rule(LISTENER);
    spec.actions = vec![
        DeclaredAction::forward_to(TARGET_GROUP).with_order(2),
        DeclaredAction::authenticate_oidc(oidc_config(CLIENT_SECRET)).with_order(1),
    ];

    let state = reconciler
        .create(&spec, &CancellationToken::new())
        .await
        .unwrap();

    let read = reconciler
        .read(&state.rule_arn, Some(&spec))
        .await
        .unwrap()
        .unwrap();
    let oidc = read.spec.actions[0].authenticate_oidc.as_ref().unwrap();
    assert_eq!(oidc.client_secret, CLIENT_SECRET);
    assert_eq!(read.spec.actions[1].target_group_arn, TARGET_GROUP);
    assert!(read.spec.actions[1].forward.is_none());

    let plan = reconciler.plan(&state.rule_arn, &spec).await.unwrap();
    assert!(plan.changes.is_empty(), "unexpected: {:?}", plan.changes.paths);

    reconciler.update(&state.rule_arn, &spec).await.unwrap();
    assert!(plane.modifies().is_empty());
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_sends_only_changed_conditions() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);
    let state = reconciler
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();

    let mut desired = forward_rule(LISTENER);
    desired.conditions = vec![DeclaredCondition::path_pattern(["/v2/*"])];
    let updated = reconciler.update(&state.rule_arn, &desired).await.unwrap();

    let modifies = plane.modifies();
    assert_eq!(modifies.len(), 1);
    assert!(modifies[0].1.actions.is_none());
    assert!(modifies[0].1.conditions.is_some());
    assert_eq!(updated.spec.conditions, desired.conditions);
    assert!(plane.priority_moves().is_empty());
}

#[tokio::test]
async fn test_update_moves_declared_priority() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);
    let state = reconciler
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();

    let mut desired = forward_rule(LISTENER);
    desired.priority = Some(20);
    let updated = reconciler.update(&state.rule_arn, &desired).await.unwrap();

    assert_eq!(updated.priority.value(), Some(20));
    assert_eq!(plane.priority_moves(), vec![(state.rule_arn.clone(), 20)]);
    assert!(plane.modifies().is_empty());
}

#[tokio::test]
async fn test_update_priority_conflict() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_rule(LISTENER, 20),
    );
    let reconciler = reconciler(&plane);
    let state = reconciler
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();

    let mut desired = forward_rule(LISTENER);
    desired.priority = Some(20);
    let err = reconciler.update(&state.rule_arn, &desired).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Allocation(AllocationError::PriorityInUse { priority: 20, .. })
    ));
}

#[tokio::test]
async fn test_update_refuses_listener_change() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);
    let state = reconciler
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();

    let err = reconciler
        .update(&state.rule_arn, &forward_rule(OTHER_LISTENER))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::ImmutableField {
            field: "listener_arn",
            ..
        }
    ));
    assert!(plane.modifies().is_empty());
}

#[tokio::test]
async fn test_inactive_block_does_not_trigger_update() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);
    let state = reconciler
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();

    let mut desired = forward_rule(LISTENER);
    desired.actions[0].redirect = Some(RedirectConfig::new(RedirectStatus::Permanent));

    let plan = reconciler.plan(&state.rule_arn, &desired).await.unwrap();
    assert!(plan.changes.is_empty(), "unexpected: {:?}", plan.changes.paths);

    reconciler.update(&state.rule_arn, &desired).await.unwrap();
    assert!(plane.modifies().is_empty());
}

// =============================================================================
// Read / delete / list
// =============================================================================

#[tokio::test]
async fn test_missing_rule_reads_as_none() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);

    let rule_arn = format!("{}/gone", LISTENER.replace(":listener/", ":listener-rule/"));
    assert!(reconciler.read(&rule_arn, None).await.unwrap().is_none());
    assert!(matches!(
        reconciler.plan(&rule_arn, &forward_rule(LISTENER)).await,
        Err(SyncError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let plane = listener_plane();
    let reconciler = reconciler(&plane);
    let state = reconciler
        .create(&forward_rule(LISTENER), &CancellationToken::new())
        .await
        .unwrap();

    reconciler.delete(&state.rule_arn).await.unwrap();
    reconciler.delete(&state.rule_arn).await.unwrap();
    assert!(reconciler.read(&state.rule_arn, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_orders_default_last() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_rule(LISTENER, 30)
            .with_rule(LISTENER, 2)
            .with_page_size(1),
    );
    let rules = reconciler(&plane).list(LISTENER).await.unwrap();

    let priorities: Vec<String> = rules.iter().map(|r| r.priority.to_string()).collect();
    assert_eq!(priorities, vec!["2", "30", "default"]);
}
