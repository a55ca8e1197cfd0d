/*!
 * Lock-Based Synchronization Primitives
 *
 * Two mutual-exclusion locks with different wait strategies:
 * - Busy-wait lock (atomic test-and-set, waiters spin)
 * - Blocking lock (mutex + condvar, waiters park)
 *
 * Both implement `RawLock`; `Lock<R, T>` turns either into a data-owning mutex.
 */

mod blocking;
mod busy_wait;
mod guard;

// Re-export public API
pub use blocking::BlockingLock;
pub use busy_wait::BusyWaitLock;
pub use guard::{BlockingMutex, BusyWaitMutex, Lock, LockGuard};
