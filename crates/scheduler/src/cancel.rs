//! Cancellation tokens for deferred work
//!
//! Deferred overlay mutations (entrance reveals, trailing throttle runs) can
//! outlive the state they were scheduled against. A token lets the owner of
//! that state cancel the pending work instead of letting it fire against a
//! node that no longer exists.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancellation token for a scheduled task
///
/// Clones share the same underlying flag, so the scheduler can keep one clone
/// inside the queue while the task's owner keeps another to cancel with.
///
/// # Example
///
/// ```
/// use overmark_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let queued = token.clone();
///
/// token.cancel();
/// assert!(queued.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new token in the non-cancelled state.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this token and every clone of it.
    ///
    /// Idempotent; cancelling twice is safe.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether `cancel()` has been called on this token or any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
