/*!
 * Synchronization Configuration
 *
 * Runtime configuration for busy-wait behaviour
 */

use crate::core::limits::{DEFAULT_MAX_SPIN_SHIFT, DEFAULT_YIELD_AFTER};

/// What a busy-waiting thread does once its spin phase is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStrategy {
    /// Keep spinning with the CPU hint. Never hands the core back.
    Spin,
    /// Spin, then `yield_now()` between polls (oversubscribed machines)
    SpinThenYield,
}

/// Synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Behaviour after the spin phase
    pub strategy: SpinStrategy,
    /// Cap on the exponential spin phase (up to 2^shift hints per poll)
    pub max_spin_shift: u32,
    /// Backoff steps before yielding (only used by `SpinThenYield`)
    pub yield_after: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl SyncConfig {
    /// Pure spinning with bounded exponential backoff
    pub const fn standard() -> Self {
        Self {
            strategy: SpinStrategy::Spin,
            max_spin_shift: DEFAULT_MAX_SPIN_SHIFT,
            yield_after: DEFAULT_YIELD_AFTER,
        }
    }

    /// Configuration optimized for very short critical sections
    ///
    /// Polls the flag after every hint.
    pub const fn low_latency() -> Self {
        Self {
            strategy: SpinStrategy::Spin,
            max_spin_shift: 0,
            yield_after: DEFAULT_YIELD_AFTER,
        }
    }

    /// Configuration for more runnable threads than cores
    pub const fn oversubscribed() -> Self {
        Self {
            strategy: SpinStrategy::SpinThenYield,
            max_spin_shift: DEFAULT_MAX_SPIN_SHIFT,
            yield_after: DEFAULT_MAX_SPIN_SHIFT,
        }
    }

    /// Whether the backoff may ever hand the core back to the scheduler
    #[inline]
    pub fn may_yield(&self) -> bool {
        matches!(self.strategy, SpinStrategy::SpinThenYield)
    }
}
