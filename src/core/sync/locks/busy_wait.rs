/*!
 * Busy-Wait Lock
 *
 * Test-and-set spinlock over a single atomic flag.
 *
 * Waiters never leave the core (unless configured to yield), so this is the
 * right choice only for very short critical sections under low contention.
 */

use crate::core::sync::config::SyncConfig;
use crate::core::sync::spinwait::Backoff;
use crate::core::sync::traits::RawLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::trace;

/// Spinlock built on an atomic test-and-set flag
///
/// # Performance
///
/// - **Uncontended**: one atomic swap to lock, one store to unlock
/// - **Contended**: waiters spin on a relaxed load (test-and-test-and-set),
///   so the cache line stays shared until the holder releases it
/// - **No fairness**: whoever wins the swap after release goes next
#[derive(Debug)]
pub struct BusyWaitLock {
    locked: AtomicBool,
    config: SyncConfig,
}

impl BusyWaitLock {
    /// Create an unlocked spinlock with the standard backoff
    pub const fn new() -> Self {
        Self::with_config(SyncConfig::standard())
    }

    /// Create an unlocked spinlock with a custom backoff
    pub const fn with_config(config: SyncConfig) -> Self {
        Self {
            locked: AtomicBool::new(false),
            config,
        }
    }

    /// Backoff configuration in use
    #[inline]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Test-and-set: claim the flag, report whether it was free
    #[inline(always)]
    fn test_and_set(&self) -> bool {
        !self.locked.swap(true, Ordering::Acquire)
    }

    #[cold]
    fn lock_contended(&self) {
        let mut backoff = Backoff::new(&self.config);
        loop {
            while self.locked.load(Ordering::Relaxed) {
                backoff.snooze();
            }
            if self.test_and_set() {
                return;
            }
            // Lost the race to another waiter: poll eagerly for its release
            backoff.reset();
        }
    }
}

impl Default for BusyWaitLock {
    fn default() -> Self {
        Self::new()
    }
}

impl RawLock for BusyWaitLock {
    #[inline]
    fn lock(&self) {
        if !self.test_and_set() {
            self.lock_contended();
        }
    }

    #[inline]
    unsafe fn unlock(&self) {
        debug_assert!(
            self.locked.load(Ordering::Relaxed),
            "unlock() called on an unheld BusyWaitLock"
        );
        self.locked.store(false, Ordering::Release);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        // compare_exchange leaves the line untouched when it is already held
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn try_lock_for(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.lock();
            return true;
        };

        let mut backoff = Backoff::new(&self.config);
        loop {
            if self.try_lock() {
                return true;
            }
            while self.locked.load(Ordering::Relaxed) {
                if Instant::now() >= deadline {
                    trace!(?timeout, "busy-wait lock acquisition timed out");
                    return false;
                }
                backoff.snooze();
            }
        }
    }

    #[inline]
    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "busy_wait"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_unlock() {
        let lock = BusyWaitLock::new();
        assert!(!lock.is_locked());

        lock.lock();
        assert!(lock.is_locked());
        unsafe { lock.unlock() };
        assert!(!lock.is_locked());

        // Reacquirable after release
        lock.lock();
        unsafe { lock.unlock() };
    }

    #[test]
    fn test_try_lock_fails_while_held() {
        let lock = BusyWaitLock::new();

        assert!(lock.try_lock());
        assert!(!lock.try_lock());

        unsafe { lock.unlock() };
        assert!(lock.try_lock());
        unsafe { lock.unlock() };
    }

    #[test]
    fn test_try_lock_for_timeout() {
        let lock = BusyWaitLock::new();
        lock.lock();

        let start = Instant::now();
        assert!(!lock.try_lock_for(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));

        unsafe { lock.unlock() };
        assert!(lock.try_lock_for(Duration::from_millis(30)));
        unsafe { lock.unlock() };
    }

    #[test]
    fn test_try_lock_for_acquires_after_release() {
        let lock = Arc::new(BusyWaitLock::new());
        lock.lock();

        let lock_clone = lock.clone();
        let handle = thread::spawn(move || {
            let acquired = lock_clone.try_lock_for(Duration::from_secs(5));
            if acquired {
                unsafe { lock_clone.unlock() };
            }
            acquired
        });

        thread::sleep(Duration::from_millis(20));
        unsafe { lock.unlock() };

        assert!(handle.join().unwrap());
    }

    #[test]
    fn test_oversubscribed_config_contention() {
        let lock = Arc::new(BusyWaitLock::with_config(SyncConfig::oversubscribed()));
        let holders = Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = lock.clone();
                let holders = holders.clone();
                thread::spawn(move || {
                    for _ in 0..500 {
                        lock.lock();
                        assert_eq!(holders.fetch_add(1, Ordering::Relaxed), 0);
                        holders.fetch_sub(1, Ordering::Relaxed);
                        unsafe { lock.unlock() };
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_const_static() {
        static LOCK: BusyWaitLock = BusyWaitLock::new();
        LOCK.lock();
        assert_eq!(LOCK.name(), "busy_wait");
        unsafe { LOCK.unlock() };
    }
}
