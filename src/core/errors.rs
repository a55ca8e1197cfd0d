/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for timed or non-blocking lock acquisition
pub type LockResult<T> = Result<T, LockError>;

/// Lock acquisition errors
///
/// Plain `lock()` never fails; these only come out of the `try_*` family.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum LockError {
    #[error("Lock acquisition timed out after {0:?}")]
    #[diagnostic(
        code(lock::timeout),
        help("The lock was held for the whole timeout. Use a longer timeout or plain lock().")
    )]
    Timeout(Duration),

    #[error("Lock is currently held")]
    #[diagnostic(
        code(lock::would_block),
        help("Another thread owns the lock. Retry later or block with lock().")
    )]
    WouldBlock,
}

impl LockError {
    /// Check if this error came from an expired deadline
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, LockError::Timeout(_))
    }
}

/// Queue errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum QueueError {
    #[error("Failed to allocate a {size}-byte queue node")]
    #[diagnostic(
        code(queue::allocation_failed),
        help("System may be low on memory. Drain the queue or free resources.")
    )]
    AllocationFailed { size: usize },
}

/// Error returned by `ConcurrentQueue::try_enqueue`
///
/// Hands the rejected value back so the caller can retry or dispose of it.
pub struct TryEnqueueError<T> {
    value: T,
    kind: QueueError,
}

impl<T> TryEnqueueError<T> {
    pub(crate) fn new(value: T, kind: QueueError) -> Self {
        Self { value, kind }
    }

    /// Why the value was rejected
    #[inline]
    pub fn kind(&self) -> QueueError {
        self.kind
    }

    /// Recover the value that could not be enqueued
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }
}

// Manual impls: derives would put a `T: Debug` bound on every use site.
impl<T> fmt::Debug for TryEnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryEnqueueError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for TryEnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl<T> std::error::Error for TryEnqueueError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
