/*!
 * Lock-Free Synchronization Primitives
 *
 * Data structures that make progress without taking any lock:
 * - Michael & Scott MPMC queue with epoch-based node reclamation
 */

mod queue;

// Re-export public API
pub use queue::ConcurrentQueue;
