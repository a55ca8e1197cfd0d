/*!
 * Blocking Lock
 *
 * Condvar-based lock: waiters are parked instead of spinning.
 *
 * # Design
 *
 * The `held` flag lives inside a `parking_lot::Mutex`, which is only ever
 * taken for a few instructions. Contenders park on a `parking_lot::Condvar`
 * and re-check `held` after every wakeup, so spurious wakeups and barging
 * threads are harmless. `unlock()` notifies exactly one waiter after dropping
 * the internal guard, which keeps the woken thread from immediately blocking
 * on it again.
 */

use crate::core::sync::traits::RawLock;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// Lock whose waiters sleep until the holder releases it
///
/// # Performance
///
/// - **Uncontended**: one internal mutex round-trip per `lock()`/`unlock()`
/// - **Contended**: waiters consume no CPU while parked
/// - **No fairness**: the woken thread can lose to a thread that arrives
///   between `unlock()` and its wakeup
///
/// Prefer it for longer critical sections or when waits may be long.
#[derive(Debug)]
pub struct BlockingLock {
    held: Mutex<bool>,
    available: Condvar,
    waiters: AtomicUsize,
}

impl BlockingLock {
    /// Create an unlocked blocking lock
    pub const fn new() -> Self {
        Self {
            held: Mutex::new(false),
            available: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Approximate number of threads parked in `lock()` (diagnostics)
    #[inline]
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}

impl Default for BlockingLock {
    fn default() -> Self {
        Self::new()
    }
}

impl RawLock for BlockingLock {
    fn lock(&self) {
        let mut held = self.held.lock();

        if *held {
            self.waiters.fetch_add(1, Ordering::Relaxed);
            // Re-validate after every wakeup: it may be spurious, or another
            // thread may have taken the lock first.
            while *held {
                self.available.wait(&mut held);
            }
            self.waiters.fetch_sub(1, Ordering::Relaxed);
        }

        *held = true;
    }

    unsafe fn unlock(&self) {
        {
            let mut held = self.held.lock();
            debug_assert!(*held, "unlock() called on an unheld BlockingLock");
            *held = false;
        }
        self.available.notify_one();
    }

    fn try_lock(&self) -> bool {
        let mut held = self.held.lock();
        if *held {
            return false;
        }
        *held = true;
        true
    }

    fn try_lock_for(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.lock();
            return true;
        };

        let mut held = self.held.lock();

        if *held {
            self.waiters.fetch_add(1, Ordering::Relaxed);
            while *held {
                if self.available.wait_until(&mut held, deadline).timed_out() && *held {
                    self.waiters.fetch_sub(1, Ordering::Relaxed);
                    trace!(?timeout, "blocking lock acquisition timed out");
                    return false;
                }
            }
            self.waiters.fetch_sub(1, Ordering::Relaxed);
        }

        *held = true;
        true
    }

    fn is_locked(&self) -> bool {
        *self.held.lock()
    }

    fn name(&self) -> &'static str {
        "blocking"
    }
}
