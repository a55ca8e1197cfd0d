/*!
 * Core
 * Synchronization primitives plus the shared error types and limits
 */

pub mod errors;
pub mod limits;
pub mod sync;

pub use errors::{LockError, LockResult, QueueError, TryEnqueueError};
