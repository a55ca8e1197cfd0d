/*!
 * Synchronization Traits
 *
 * Core abstraction shared by the lock variants.
 *
 * # Design: Trait-Based Abstraction for Implementations
 *
 * `Lock<R, T>` is generic over `RawLock`, so the data-owning wrapper,
 * tests and benchmarks are written once and monomorphized per variant.
 */

use std::time::Duration;

/// A mutual-exclusion primitive that guards no data of its own
///
/// Implementations must be:
/// - **Exclusive**: at most one thread holds the lock at a time
/// - **Ordered**: everything written before `unlock()` is visible to the
///   thread whose `lock()` returns next (release/acquire)
///
/// No fairness is promised between waiters.
pub trait RawLock: Send + Sync {
    /// Block until the lock is acquired. Never fails.
    fn lock(&self);

    /// Release the lock
    ///
    /// # Safety
    ///
    /// The calling context must currently hold the lock, acquired through
    /// `lock()`, a successful `try_lock()` or a successful `try_lock_for()`.
    unsafe fn unlock(&self);

    /// Acquire the lock only if it is free right now
    fn try_lock(&self) -> bool;

    /// Keep trying until `timeout` elapses
    ///
    /// Returns `true` if the lock was acquired.
    fn try_lock_for(&self, timeout: Duration) -> bool;

    /// Snapshot of the lock state (racy, diagnostics only)
    fn is_locked(&self) -> bool;

    /// Lock name for debugging
    fn name(&self) -> &'static str;
}
