/*!
 * Data-Owning Lock and RAII Guard
 *
 * Pairs any `RawLock` with the state it protects, so shared data is only
 * reachable while the lock is held and release cannot be forgotten.
 */

use super::{BlockingLock, BusyWaitLock};
use crate::core::errors::{LockError, LockResult};
use crate::core::sync::config::SyncConfig;
use crate::core::sync::traits::RawLock;
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

/// Spinning mutex over `T`
pub type BusyWaitMutex<T> = Lock<BusyWaitLock, T>;

/// Parking mutex over `T`
pub type BlockingMutex<T> = Lock<BlockingLock, T>;

/// Mutual exclusion around caller-supplied data
///
/// # Example
///
/// ```
/// use ai_os_sync::core::sync::BusyWaitMutex;
/// use std::sync::Arc;
/// use std::thread;
///
/// let counter = Arc::new(BusyWaitMutex::new(0u64));
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let counter = counter.clone();
///         thread::spawn(move || {
///             for _ in 0..1000 {
///                 *counter.lock() += 1;
///             }
///         })
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(*counter.lock(), 4000);
/// ```
pub struct Lock<R: RawLock, T: ?Sized> {
    raw: R,
    data: UnsafeCell<T>,
}

// SAFETY: the raw lock serialises every access to `data`, so sharing the
// wrapper only ever moves `&mut T` between threads one at a time.
unsafe impl<R: RawLock, T: ?Sized + Send> Send for Lock<R, T> {}
unsafe impl<R: RawLock, T: ?Sized + Send> Sync for Lock<R, T> {}

impl<R: RawLock + Default, T> Lock<R, T> {
    /// Create an unlocked lock around `value`
    #[inline]
    pub fn new(value: T) -> Self {
        Self::from_raw(R::default(), value)
    }
}

impl<T> Lock<BusyWaitLock, T> {
    /// Create a spinning mutex with a custom backoff
    #[inline]
    pub fn with_config(value: T, config: SyncConfig) -> Self {
        Self::from_raw(BusyWaitLock::with_config(config), value)
    }
}

impl<R: RawLock, T> Lock<R, T> {
    /// Wrap `value` with an existing raw lock
    #[inline]
    pub fn from_raw(raw: R, value: T) -> Self {
        Self {
            raw,
            data: UnsafeCell::new(value),
        }
    }

    /// Consume the lock and return the data
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<R: RawLock, T: ?Sized> Lock<R, T> {
    /// Block until the lock is held and return a guard
    #[inline]
    pub fn lock(&self) -> LockGuard<'_, R, T> {
        self.raw.lock();
        // SAFETY: just acquired
        unsafe { LockGuard::new(self) }
    }

    /// Acquire only if the lock is free right now
    #[inline]
    pub fn try_lock(&self) -> LockResult<LockGuard<'_, R, T>> {
        if self.raw.try_lock() {
            // SAFETY: just acquired
            Ok(unsafe { LockGuard::new(self) })
        } else {
            Err(LockError::WouldBlock)
        }
    }

    /// Acquire, giving up after `timeout`
    pub fn try_lock_for(&self, timeout: Duration) -> LockResult<LockGuard<'_, R, T>> {
        if self.raw.try_lock_for(timeout) {
            // SAFETY: just acquired
            Ok(unsafe { LockGuard::new(self) })
        } else {
            Err(LockError::Timeout(timeout))
        }
    }

    /// Run `f` with exclusive access (takes the lock briefly)
    #[inline]
    pub fn with<F, U>(&self, f: F) -> U
    where
        F: FnOnce(&mut T) -> U,
    {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Exclusive access without locking (the borrow proves no one else holds it)
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Snapshot of the lock state (racy, diagnostics only)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// The underlying raw lock
    #[inline]
    pub fn raw(&self) -> &R {
        &self.raw
    }
}

impl<R: RawLock + Default, T: Default> Default for Lock<R, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<R: RawLock + Default, T> From<T> for Lock<R, T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<R: RawLock, T: ?Sized + fmt::Debug> fmt::Debug for Lock<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Lock");
        d.field("kind", &self.raw.name());
        match self.try_lock() {
            Ok(guard) => d.field("data", &&*guard),
            Err(_) => d.field("data", &format_args!("<locked>")),
        };
        d.finish()
    }
}

/// RAII guard: the lock is held for as long as this value lives
///
/// `Send` iff `T: Send`, `Sync` iff `T: Sync`.
#[must_use = "if unused the lock is released immediately"]
pub struct LockGuard<'a, R: RawLock, T: ?Sized> {
    lock: &'a Lock<R, T>,
    _marker: PhantomData<&'a mut T>,
}

// SAFETY: a shared guard only hands out `&T`; release needs the owned guard.
unsafe impl<R: RawLock, T: ?Sized + Sync> Sync for LockGuard<'_, R, T> {}

impl<'a, R: RawLock, T: ?Sized> LockGuard<'a, R, T> {
    /// # Safety
    ///
    /// `lock.raw` must be held by the caller; ownership of that hold moves
    /// into the guard.
    #[inline]
    unsafe fn new(lock: &'a Lock<R, T>) -> Self {
        Self {
            lock,
            _marker: PhantomData,
        }
    }
}

impl<R: RawLock, T: ?Sized> Deref for LockGuard<'_, R, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the guard owns the hold
        unsafe { &*self.lock.data.get() }
    }
}

impl<R: RawLock, T: ?Sized> DerefMut for LockGuard<'_, R, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard owns the hold, and `&mut self` makes it unique
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<R: RawLock, T: ?Sized> Drop for LockGuard<'_, R, T> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: the guard owns the hold
        unsafe { self.lock.raw.unlock() }
    }
}

impl<R: RawLock, T: ?Sized + fmt::Debug> fmt::Debug for LockGuard<'_, R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
