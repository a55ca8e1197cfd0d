/*!
 * Lock-Free MPMC Queue
 * Michael & Scott linked queue with epoch-based reclamation
 *
 * # Layout
 *
 * ```text
 *  head                                  tail
 *   |                                     |
 *   v                                     v
 * [sentinel] -> [v1] -> [v2] -> ... -> [vN] -> null
 * ```
 *
 * `head` always points at a consumed node (its value slot is dead); the next
 * value to dequeue lives in `head.next`. A successful dequeue swings `head`
 * forward and the old sentinel is retired. `tail` may trail the real last
 * node by one link while an enqueue is in flight; every operation that sees
 * this helps move it forward.
 *
 * # Safety
 *
 * Uses crossbeam-epoch: every traversal runs pinned, and retired nodes are
 * only deallocated after all threads pinned at retirement time have moved on.
 */

use crate::core::errors::{QueueError, TryEnqueueError};
use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ops::Deref;
use std::sync::atomic::Ordering;
use tracing::{debug, warn};

/// Keeps `head` and `tail` off each other's cache line
#[repr(align(64))]
struct CachePadded<T>(T);

impl<T> Deref for CachePadded<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

struct Node<T> {
    /// Initialised for every node except the current sentinel, whose value
    /// has been moved out (or never existed).
    value: MaybeUninit<T>,
    next: Atomic<Node<T>>,
}

impl<T> Node<T> {
    #[inline]
    fn new(value: MaybeUninit<T>) -> Self {
        Self {
            value,
            next: Atomic::null(),
        }
    }
}

/// Unbounded lock-free multi-producer multi-consumer FIFO queue
///
/// # Guarantees
///
/// - **Lock-free**: a stalled thread never blocks the others
/// - **FIFO per producer**: values from one thread come out in push order
/// - **No loss, no duplication**: every enqueued value is dequeued exactly once
///
/// # Example
///
/// ```
/// use ai_os_sync::core::sync::ConcurrentQueue;
///
/// let queue = ConcurrentQueue::new();
/// queue.enqueue(1);
/// queue.enqueue(2);
///
/// assert_eq!(queue.dequeue(), Some(1));
/// assert_eq!(queue.dequeue(), Some(2));
/// assert_eq!(queue.dequeue(), None);
/// ```
pub struct ConcurrentQueue<T> {
    head: CachePadded<Atomic<Node<T>>>,
    tail: CachePadded<Atomic<Node<T>>>,
    _marker: PhantomData<T>,
}

// SAFETY: values move between threads through the queue but are never shared
unsafe impl<T: Send> Send for ConcurrentQueue<T> {}
unsafe impl<T: Send> Sync for ConcurrentQueue<T> {}

impl<T> ConcurrentQueue<T> {
    /// Create an empty queue (allocates the sentinel)
    pub fn new() -> Self {
        let queue = Self {
            head: CachePadded(Atomic::null()),
            tail: CachePadded(Atomic::null()),
            _marker: PhantomData,
        };

        let sentinel = Owned::new(Node::new(MaybeUninit::uninit()));
        // SAFETY: the queue is not shared yet
        unsafe {
            let guard = epoch::unprotected();
            let sentinel = sentinel.into_shared(guard);
            queue.head.store(sentinel, Ordering::Relaxed);
            queue.tail.store(sentinel, Ordering::Relaxed);
        }

        queue
    }

    /// Append `value` at the tail
    ///
    /// Always succeeds; aborts on allocation failure like `Box::new`.
    /// Use `try_enqueue` to get the value back instead.
    pub fn enqueue(&self, value: T) {
        let guard = &epoch::pin();
        let node = Owned::new(Node::new(MaybeUninit::new(value))).into_shared(guard);
        self.link(node, guard);
    }

    /// Append `value`, handing it back if the node cannot be allocated
    pub fn try_enqueue(&self, value: T) -> Result<(), TryEnqueueError<T>> {
        let layout = Layout::new::<Node<T>>();

        // SAFETY: Node<T> always contains a pointer, so the layout is non-zero
        let ptr = unsafe { alloc::alloc(layout) }.cast::<Node<T>>();
        if ptr.is_null() {
            warn!(size = layout.size(), "queue node allocation failed");
            return Err(TryEnqueueError::new(
                value,
                QueueError::AllocationFailed {
                    size: layout.size(),
                },
            ));
        }

        // SAFETY: `ptr` is a fresh global-allocator block with Node<T>'s
        // layout, which is exactly what Box expects to own.
        let node = unsafe {
            ptr.write(Node::new(MaybeUninit::new(value)));
            Box::from_raw(ptr)
        };

        let guard = &epoch::pin();
        self.link(Owned::<Node<T>>::from(node).into_shared(guard), guard);
        Ok(())
    }

    /// Remove and return the oldest value, or `None` if the queue is empty
    ///
    /// Never blocks. `None` only means nothing was linked at the moment of
    /// the attempt; a concurrent producer may publish right after.
    pub fn dequeue(&self) -> Option<T> {
        let guard = &epoch::pin();
        self.unlink(guard)
    }

    /// Snapshot emptiness check (may be stale under concurrency)
    pub fn is_empty(&self) -> bool {
        let guard = &epoch::pin();
        let head = self.head.load(Ordering::Acquire, guard);
        // SAFETY: head is never null and pinned nodes are never freed
        unsafe { head.deref() }
            .next
            .load(Ordering::Acquire, guard)
            .is_null()
    }

    /// Link a node after the current last node
    fn link<'g>(&self, node: Shared<'g, Node<T>>, guard: &'g Guard) {
        loop {
            let tail = self.tail.load(Ordering::Acquire, guard);
            // SAFETY: tail is never null and pinned nodes are never freed
            let tail_ref = unsafe { tail.deref() };
            let next = tail_ref.next.load(Ordering::Acquire, guard);

            if !next.is_null() {
                // Someone linked but has not moved tail yet: help, then retry
                let _ = self.tail.compare_exchange(
                    tail,
                    next,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                );
                continue;
            }

            if tail_ref
                .next
                .compare_exchange(
                    Shared::null(),
                    node,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                )
                .is_ok()
            {
                // Best effort: a failure means another thread already helped
                let _ = self.tail.compare_exchange(
                    tail,
                    node,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                );
                return;
            }
        }
    }

    /// Swing head forward by one node and take its value
    fn unlink(&self, guard: &Guard) -> Option<T> {
        loop {
            let head = self.head.load(Ordering::Acquire, guard);
            // SAFETY: head is never null and pinned nodes are never freed
            let next = unsafe { head.deref() }.next.load(Ordering::Acquire, guard);
            // SAFETY: as above
            let next_ref = unsafe { next.as_ref() }?;

            // Never retire a node tail still points at
            let tail = self.tail.load(Ordering::Relaxed, guard);
            if tail == head {
                let _ = self.tail.compare_exchange(
                    tail,
                    next,
                    Ordering::Release,
                    Ordering::Relaxed,
                    guard,
                );
            }

            if self
                .head
                .compare_exchange(head, next, Ordering::Release, Ordering::Relaxed, guard)
                .is_ok()
            {
                // SAFETY: winning the CAS makes this thread the only reader of
                // `next.value`, which is now the dead slot of the new sentinel.
                // The old head is unreachable for new readers; the epoch keeps
                // it alive for current ones.
                unsafe {
                    guard.defer_destroy(head);
                    return Some(next_ref.value.assume_init_read());
                }
            }
        }
    }
}

impl<T> Default for ConcurrentQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ConcurrentQueue<T> {
    fn drop(&mut self) {
        let mut drained = 0usize;

        // SAFETY: `&mut self` means no other thread can touch the queue, so
        // nodes can be released immediately.
        unsafe {
            let guard = epoch::unprotected();
            while self.unlink(guard).is_some() {
                drained += 1;
            }
            let sentinel = self.head.load(Ordering::Relaxed, guard);
            drop(sentinel.into_owned());
        }

        if drained > 0 {
            debug!(drained, "queue dropped with values still enqueued");
        }
    }
}

impl<T> FromIterator<T> for ConcurrentQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut queue = Self::new();
        queue.extend(iter);
        queue
    }
}

impl<T> Extend<T> for ConcurrentQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.enqueue(value);
        }
    }
}

impl<T> Extend<T> for &ConcurrentQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.enqueue(value);
        }
    }
}

impl<T> fmt::Debug for ConcurrentQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentQueue")
            .field("is_empty", &self.is_empty())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::limits::CACHE_LINE_SIZE;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_single_thread() {
        let queue = ConcurrentQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), Some(3));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_empty_queue() {
        let queue: ConcurrentQueue<String> = ConcurrentQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.dequeue(), None);

        queue.enqueue("x".to_string());
        assert!(!queue.is_empty());
        assert_eq!(queue.dequeue().as_deref(), Some("x"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_try_enqueue() {
        let queue = ConcurrentQueue::new();
        assert!(queue.try_enqueue(10).is_ok());
        queue.enqueue(20);
        assert!(queue.try_enqueue(30).is_ok());

        let drained: Vec<_> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(drained, vec![10, 20, 30]);
    }

    #[test]
    fn test_from_iter_and_extend() {
        let mut queue: ConcurrentQueue<u32> = (0..3).collect();
        queue.extend(3..5);

        let drained: Vec<_> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_drop_releases_remaining_values() {
        let value = Arc::new(());
        {
            let queue = ConcurrentQueue::new();
            for _ in 0..10 {
                queue.enqueue(value.clone());
            }
            drop(queue.dequeue());
            assert_eq!(Arc::strong_count(&value), 10);
        }
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_dequeued_values_dropped_once() {
        struct Counted(Arc<AtomicUsize>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let queue = ConcurrentQueue::new();
        for _ in 0..100 {
            queue.enqueue(Counted(drops.clone()));
        }
        for _ in 0..50 {
            drop(queue.dequeue());
        }
        assert_eq!(drops.load(Ordering::Relaxed), 50);

        drop(queue);
        assert_eq!(drops.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_single_element_race() {
        // Producer and consumer keep the queue hovering around one element
        let queue = Arc::new(ConcurrentQueue::new());
        let queue_clone = queue.clone();

        let producer = thread::spawn(move || {
            for i in 0..20_000u64 {
                queue_clone.enqueue(i);
            }
        });

        let mut expected = 0u64;
        while expected < 20_000 {
            if let Some(v) = queue.dequeue() {
                assert_eq!(v, expected);
                expected += 1;
            }
        }

        producer.join().unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_head_tail_padding() {
        assert_eq!(std::mem::align_of::<CachePadded<Atomic<Node<u8>>>>(), CACHE_LINE_SIZE);
    }

    #[test]
    fn test_debug() {
        let queue = ConcurrentQueue::new();
        queue.enqueue(1);
        assert!(format!("{:?}", queue).contains("is_empty: false"));
    }
}
