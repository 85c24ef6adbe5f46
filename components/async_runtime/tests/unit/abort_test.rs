//! Unit tests for AbortToken

use async_runtime::AbortToken;
use std::time::Duration;

#[test]
fn new_token_is_not_aborted() {
    let token = AbortToken::new();
    assert!(!token.is_aborted());
}

#[test]
fn abort_is_idempotent() {
    let token = AbortToken::new();
    assert!(token.abort());
    assert!(!token.abort());
    assert!(!token.clone().abort());
    assert!(token.is_aborted());
}

#[test]
fn clones_share_state() {
    let token = AbortToken::new();
    let handle = token.clone();
    handle.abort();
    assert!(token.is_aborted());
    assert!(token.same_as(&handle));
    assert_eq!(token.id(), handle.id());
}

#[test]
fn abort_from_another_thread_wakes_waiter() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let token = AbortToken::new();
    let remote = token.clone();
    let aborter = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(10));
        remote.abort();
    });
    runtime.block_on(async {
        tokio::time::timeout(Duration::from_secs(2), token.cancelled())
            .await
            .unwrap();
    });
    aborter.join().unwrap();
}

#[test]
fn race_prefers_completed_work_when_not_aborted() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let token = AbortToken::new();
    let outcome = runtime.block_on(async {
        tokio::select! {
            _ = token.cancelled() => "cancelled",
            _ = tokio::time::sleep(Duration::from_millis(1)) => "done",
        }
    });
    assert_eq!(outcome, "done");
}
