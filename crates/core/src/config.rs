//! Process-wide tunables
//!
//! The single configuration knob of this layer: the result-window size that
//! `many()` forces. Set it once during application wiring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Default result-window size used by `many()`
pub const DEFAULT_MANY_SIZE: u64 = 10_000;

static MANY_SIZE: AtomicU64 = AtomicU64::new(DEFAULT_MANY_SIZE);

/// The configured `many()` window size
pub fn many_size() -> u64 {
    MANY_SIZE.load(Ordering::Relaxed)
}

/// Override the `many()` window size process-wide
pub fn set_many_size(size: u64) {
    MANY_SIZE.store(size, Ordering::Relaxed);
}
