//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is a clone-able handle shared between a caller
//! and the operations it may want to abort. Cancellation propagates
//! top-down: caller -> loop -> (model call | tool batch) -> individual
//! tool. Timeouts are a derived trigger ([`CancellationToken::with_timeout`]),
//! not a separate mechanism.

use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::Notify;

/// Error reported when an operation observes a triggered token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("operation was cancelled")]
pub struct CancelledError;

type Callback = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Inner {
    cancelled: bool,
    callbacks: Vec<Callback>,
}

/// Clone-able cancellation handle.
///
/// All clones observe the same state; `cancel` is idempotent.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Mutex<Inner>>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger cancellation, running registered callbacks and waking all
    /// tasks blocked in [`cancelled`](Self::cancelled).
    pub fn cancel(&self) {
        let callbacks = {
            let mut inner = self.inner.lock().unwrap();
            if inner.cancelled {
                return;
            }
            inner.cancelled = true;
            std::mem::take(&mut inner.callbacks)
        };
        // Callbacks run outside the lock; a callback may touch this token.
        for callback in &callbacks {
            callback();
        }
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().unwrap().cancelled
    }

    /// Register a callback invoked on cancellation. If the token is already
    /// cancelled the callback runs immediately.
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        {
            let mut inner = self.inner.lock().unwrap();
            if !inner.cancelled {
                inner.callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }

    /// Wait until this token is cancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register for wakeup before the final check; a cancel landing
        // between the check and the await would otherwise be missed.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Return an error if the token has been triggered.
    pub fn check_cancelled(&self) -> Result<(), CancelledError> {
        if self.is_cancelled() {
            Err(CancelledError)
        } else {
            Ok(())
        }
    }

    /// Create a child token cancelled whenever this token is cancelled.
    pub fn child(&self) -> CancellationToken {
        let child = CancellationToken::new();
        let handle = child.clone();
        self.add_callback(move || handle.cancel());
        child
    }

    /// Combine tokens: the result is cancelled when any input is cancelled.
    pub fn combine(tokens: impl IntoIterator<Item = CancellationToken>) -> CancellationToken {
        let combined = CancellationToken::new();
        for token in tokens {
            let handle = combined.clone();
            token.add_callback(move || handle.cancel());
        }
        combined
    }

    /// Create a token that cancels itself after `duration`.
    pub fn with_timeout(duration: std::time::Duration) -> CancellationToken {
        let token = CancellationToken::new();
        let handle = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            handle.cancel();
        });
        token
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[test]
    fn test_new_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check_cancelled().is_ok());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let c = count.clone();
        token.add_callback(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_on_already_cancelled_token_runs_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        token.add_callback(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiters() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
            "cancelled"
        });

        sleep(Duration::from_millis(10)).await;
        token.cancel();
        assert_eq!(handle.await.unwrap(), "cancelled");
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_triggered() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancelled().await;
    }

    #[tokio::test]
    async fn test_child_token_follows_parent() {
        let parent = CancellationToken::new();
        let child = parent.child();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_combined_token_cancelled_by_any_input() {
        let a = CancellationToken::new();
        let b = CancellationToken::new();
        let combined = CancellationToken::combine([a.clone(), b.clone()]);
        assert!(!combined.is_cancelled());
        b.cancel();
        assert!(combined.is_cancelled());
        assert!(!a.is_cancelled());
    }

    #[tokio::test]
    async fn test_timeout_token_cancels_itself() {
        let token = CancellationToken::with_timeout(Duration::from_millis(20));
        assert!(!token.is_cancelled());
        token.cancelled().await;
        assert!(token.is_cancelled());
    }
}
