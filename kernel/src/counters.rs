//! Global interrupt error counters.
//!
//! `ERR` counts spurious interrupts (nobody handled the occurrence) and `MIS`
//! counts IO-APIC/local APIC mismatches seen by the controller code. Both are
//! bumped from any CPU without locks and read with plain atomic loads; no
//! ordering is implied against the per-CPU line counters.

use core::sync::atomic::{AtomicU32, Ordering};

pub struct ErrorCounters {
    err: AtomicU32,
    mis: AtomicU32,
}

impl ErrorCounters {
    pub const fn new() -> Self {
        Self {
            err: AtomicU32::new(0),
            mis: AtomicU32::new(0),
        }
    }

    /// Count a spurious or otherwise erroneous interrupt.
    #[inline]
    pub fn note_error(&self) {
        self.err.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a controller mismatch.
    #[inline]
    pub fn note_mismatch(&self) {
        self.mis.fetch_add(1, Ordering::Relaxed);
    }

    pub fn errors(&self) -> u32 {
        self.err.load(Ordering::Relaxed)
    }

    pub fn mismatches(&self) -> u32 {
        self.mis.load(Ordering::Relaxed)
    }
}

impl Default for ErrorCounters {
    fn default() -> Self {
        Self::new()
    }
}
