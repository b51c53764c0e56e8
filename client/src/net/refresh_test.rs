use super::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

#[tokio::test]
async fn concurrent_joiners_share_one_start() {
    let coordinator = Arc::new(RefreshCoordinator::new());
    let starts = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Notify::new());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let starts = Arc::clone(&starts);
        let gate = Arc::clone(&gate);
        handles.push(coordinator.join_or_start(move || {
            starts.fetch_add(1, Ordering::SeqCst);
            async move {
                gate.notified().await;
                Ok(())
            }
        }));
    }

    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert!(coordinator.is_refreshing());

    gate.notify_one();
    for handle in handles {
        assert_eq!(handle.await, Ok(()));
    }
    assert!(!coordinator.is_refreshing());
}

#[tokio::test]
async fn failure_is_broadcast_and_slot_cleared() {
    let coordinator = Arc::new(RefreshCoordinator::new());
    let first = coordinator.join_or_start(|| async { Err(RefreshFailure::rejected(401)) });
    let second = coordinator.join_or_start(|| async { Ok(()) });

    let expected = Err(RefreshFailure::rejected(401));
    assert_eq!(first.await, expected);
    assert_eq!(second.await, expected);
    assert!(!coordinator.is_refreshing());
}

#[tokio::test]
async fn new_refresh_starts_after_previous_settles() {
    let coordinator = Arc::new(RefreshCoordinator::new());
    let starts = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let starts = Arc::clone(&starts);
        let handle = coordinator.join_or_start(move || {
            starts.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        });
        handle.await.unwrap();
    }

    assert_eq!(starts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn dropped_waiter_does_not_cancel_refresh() {
    let coordinator = Arc::new(RefreshCoordinator::new());
    let finished = Arc::new(Notify::new());
    let done = Arc::clone(&finished);

    let handle = coordinator.join_or_start(move || async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        done.notify_one();
        Ok(())
    });
    drop(handle);

    tokio::time::timeout(std::time::Duration::from_secs(2), finished.notified())
        .await
        .expect("refresh task should run to completion");
}
