/*!
 * Synchronization Primitives
 *
 * Thread-synchronization building blocks with different wait strategies:
 * - Busy-wait lock (atomic test-and-set, lowest latency, burns CPU)
 * - Blocking lock (mutex + condvar, waiters park)
 * - Lock-free MPMC queue (Michael & Scott, epoch reclamation)
 *
 * # Architecture
 *
 * Both locks implement `RawLock`, which guards no data. `Lock<R, T>` owns the
 * caller's state and hands out RAII guards, so the same wrapper works with
 * either wait strategy.
 *
 * # Ordering
 *
 * - Locks: everything written before `unlock()` is visible after the next
 *   successful `lock()`
 * - Queue: FIFO per producer; producers interleave in CAS order
 */

mod config;
mod lockfree;
mod locks;
mod spinwait;
mod traits;

pub use config::{SpinStrategy, SyncConfig};
pub use traits::RawLock;

// Re-export specific primitives
pub use lockfree::ConcurrentQueue;
pub use locks::{BlockingLock, BlockingMutex, BusyWaitLock, BusyWaitMutex, Lock, LockGuard};
pub use spinwait::Backoff;
