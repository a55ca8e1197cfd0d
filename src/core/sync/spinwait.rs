/*!
 * Spin Backoff
 *
 * Exponential backoff for busy-wait loops.
 *
 * # Design: Exponential Backoff Over Linear Spinning
 *
 * Hammering a contended cache line with loads slows the holder down. Each
 * `snooze()` issues 2^step `spin_loop()` hints, doubling up to
 * `max_spin_shift`:
 *
 * 1. **Spin phase**: hint count doubles every call
 * 2. **Saturated phase**: hint count stays at 2^max_spin_shift
 * 3. **Yield phase** (`SpinThenYield` only): `yield_now()` once past `yield_after`
 *
 * With the default `Spin` strategy the thread never leaves the core.
 */

use super::config::SyncConfig;
use std::hint;
use std::thread;

/// Backoff state for a single wait episode
///
/// Create one per acquisition attempt; it is a few words on the stack.
#[derive(Debug, Clone)]
pub struct Backoff {
    step: u32,
    max_spin_shift: u32,
    yield_after: Option<u32>,
}

impl Backoff {
    /// Create a backoff following `config`
    #[inline]
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            step: 0,
            max_spin_shift: config.max_spin_shift,
            yield_after: config.may_yield().then_some(config.yield_after),
        }
    }

    /// Wait a little before the next poll
    #[inline]
    pub fn snooze(&mut self) {
        if let Some(limit) = self.yield_after {
            if self.step >= limit {
                thread::yield_now();
                return;
            }
        }

        let shift = self.step.min(self.max_spin_shift).min(u32::BITS - 1);
        for _ in 0..(1u32 << shift) {
            hint::spin_loop();
        }

        self.step = self.step.saturating_add(1);
    }

    /// Start over from the shortest spin
    #[inline]
    pub fn reset(&mut self) {
        self.step = 0;
    }

    /// Whether the next `snooze()` yields instead of spinning
    #[cfg(test)]
    fn is_yielding(&self) -> bool {
        self.yield_after.is_some_and(|limit| self.step >= limit)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}
