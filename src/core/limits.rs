/*!
 * Tuning Limits
 * Compile-time constants shared by the synchronization primitives
 */

/// Default cap on the exponential spin phase: at most 2^6 = 64 hints per poll
pub const DEFAULT_MAX_SPIN_SHIFT: u32 = 6;

/// Default number of backoff steps before a yielding strategy starts yielding
pub const DEFAULT_YIELD_AFTER: u32 = 10;

/// Cache line size assumed for padding hot atomics
pub const CACHE_LINE_SIZE: usize = 64;
