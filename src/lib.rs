/*!
 * AI-OS Sync Library
 * Low-level thread synchronization: spin and blocking locks, lock-free queue
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{LockError, LockResult, QueueError, TryEnqueueError};
pub use crate::core::sync::{
    BlockingLock, BlockingMutex, BusyWaitLock, BusyWaitMutex, ConcurrentQueue, Lock, LockGuard,
    RawLock, SpinStrategy, SyncConfig,
};
pub use monitoring::init_tracing;
