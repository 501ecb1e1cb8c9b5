//! Priority allocation against a shared in-memory control plane.

mod common;

use common::{forward_rule, InMemoryControlPlane, LISTENER};
use lbrule::allocator::{AllocationError, CreateRule, PriorityAllocator, RetryPolicy};
use lbrule::model::MAX_PRIORITY;
use lbrule::translate::expand_rule;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn create_request(priority: Option<u32>) -> CreateRule {
    let spec = forward_rule(LISTENER);
    let (actions, conditions) = expand_rule(&spec).unwrap();
    CreateRule {
        listener_arn: LISTENER.to_string(),
        priority,
        actions,
        conditions,
        tags: Default::default(),
    }
}

#[tokio::test]
async fn test_conflict_rescans_and_takes_next_priority() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_rule(LISTENER, 5)
            .with_rule(LISTENER, 10),
    );
    plane.steal_next_creates(1);
    let allocator = PriorityAllocator::new(plane.clone(), RetryPolicy::default());

    let rule = allocator
        .create(create_request(None), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(rule.priority.value(), Some(12));
    assert_eq!(plane.attempted_priorities(), vec![11, 12]);
    assert_eq!(plane.list_calls(), 2);
    assert_eq!(plane.priorities(LISTENER), vec![5, 10, 11, 12]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_unique_priorities() {
    const WRITERS: usize = 16;

    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_rule(LISTENER, 3)
            .with_page_size(4),
    );
    let allocator = PriorityAllocator::new(plane.clone(), RetryPolicy::new(Duration::from_secs(30)));
    let cancel = CancellationToken::new();

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let allocator = allocator.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { allocator.create(create_request(None), &cancel).await })
        })
        .collect();

    let mut priorities = BTreeSet::new();
    for handle in handles {
        let rule = handle.await.unwrap().unwrap();
        assert!(priorities.insert(rule.priority.value().unwrap()));
    }

    assert_eq!(priorities.len(), WRITERS);
    assert!(priorities.iter().all(|p| *p > 3));
    assert_eq!(plane.priorities(LISTENER).len(), WRITERS + 1);
}

#[tokio::test]
async fn test_budget_exhaustion_reports_attempts() {
    let plane = Arc::new(InMemoryControlPlane::new().with_listener(LISTENER));
    plane.steal_next_creates(u32::MAX);
    let allocator = PriorityAllocator::new(plane.clone(), RetryPolicy::new(Duration::ZERO));

    let err = allocator
        .create(create_request(None), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        AllocationError::ConflictExhausted { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("Expected ConflictExhausted, got {:?}", other),
    }
    assert_eq!(plane.attempted_priorities(), vec![1, 2]);
}

#[tokio::test]
async fn test_pinned_priority_conflict_is_not_retried() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_rule(LISTENER, 40),
    );
    let allocator = PriorityAllocator::new(plane.clone(), RetryPolicy::default());

    let err = allocator
        .create(create_request(Some(40)), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AllocationError::PriorityInUse {
            listener_arn: LISTENER.to_string(),
            priority: 40
        }
    );
    assert_eq!(plane.attempted_priorities(), vec![40]);
}

#[tokio::test]
async fn test_pinned_priority_skips_scan() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_rule(LISTENER, 40),
    );
    let allocator = PriorityAllocator::new(plane.clone(), RetryPolicy::default());

    let rule = allocator
        .create(create_request(Some(2)), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(rule.priority.value(), Some(2));
    assert_eq!(plane.list_calls(), 0);
    assert_eq!(plane.attempted_priorities(), vec![2]);
}

#[tokio::test]
async fn test_full_listener_cannot_allocate() {
    let plane = Arc::new(
        InMemoryControlPlane::new()
            .with_listener(LISTENER)
            .with_rule(LISTENER, MAX_PRIORITY),
    );
    let allocator = PriorityAllocator::new(plane.clone(), RetryPolicy::default());

    let err = allocator
        .create(create_request(None), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::PriorityRangeExhausted { highest, .. } if highest == MAX_PRIORITY
    ));
    assert!(plane.attempted_priorities().is_empty());
}

#[tokio::test]
async fn test_unknown_listener_is_reported() {
    let plane = Arc::new(InMemoryControlPlane::new());
    let allocator = PriorityAllocator::new(plane, RetryPolicy::default());

    let err = allocator
        .create(create_request(None), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, AllocationError::ListenerNotFound(LISTENER.to_string()));
}
