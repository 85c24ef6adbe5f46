//! Per-execution cancellation.
//!
//! Every execution gets a fresh [`AbortToken`]. The orchestrator races the
//! execution against [`AbortToken::cancelled`]; aborting only ever affects
//! the execution the token was created for.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const RUNNING: u8 = 0;
const ABORTED: u8 = 1;
const COMMITTED: u8 = 2;

#[derive(Debug)]
struct Inner {
    id: u64,
    state: AtomicU8,
    notify: Notify,
}

/// A cancellation handle shared between an execution and whoever may abort it.
///
/// Clones share state. Tokens are never reset: once aborted, a token stays
/// aborted, and a new execution must create a new token.
///
/// # Examples
///
/// ```
/// use async_runtime::AbortToken;
///
/// let token = AbortToken::new();
/// let handle = token.clone();
/// assert!(!token.is_aborted());
///
/// assert!(handle.abort());
/// assert!(!handle.abort());
/// assert!(token.is_aborted());
///
/// assert_ne!(AbortToken::new().id(), token.id());
/// ```
#[derive(Debug, Clone)]
pub struct AbortToken {
    inner: Arc<Inner>,
}

impl AbortToken {
    /// Creates a token that is not aborted.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                state: AtomicU8::new(RUNNING),
                notify: Notify::new(),
            }),
        }
    }

    /// Unique identifier of this token (shared by its clones).
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Aborts the token.
    ///
    /// Returns `true` only for the call that actually aborted it. A token
    /// that was already committed can't be aborted.
    pub fn abort(&self) -> bool {
        let first = self
            .inner
            .state
            .compare_exchange(RUNNING, ABORTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// Marks the execution as past the point where it can be aborted.
    ///
    /// Returns `false` if the token was aborted first; the caller must then
    /// discard its results. Committing twice is allowed.
    pub fn commit(&self) -> bool {
        match self
            .inner
            .state
            .compare_exchange(RUNNING, COMMITTED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => current == COMMITTED,
        }
    }

    /// Returns whether the token has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == ABORTED
    }

    /// Completes once the token is aborted.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so an abort in between is seen.
            notified.as_mut().enable();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }

    /// Returns whether two handles belong to the same token.
    pub fn same_as(&self, other: &AbortToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for AbortToken {
    fn default() -> Self {
        Self::new()
    }
}
