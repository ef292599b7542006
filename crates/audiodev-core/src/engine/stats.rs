//! Per-engine transfer counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated from both the hardware callback and the worker thread.
#[derive(Debug, Default)]
pub struct EngineStats {
    /// Hardware callbacks handled
    callbacks: AtomicU64,
    /// Application frames exchanged (worker iterations that advanced the timestamp)
    frames: AtomicU64,
    /// Writes rejected by a full ring buffer
    overflows: AtomicU64,
    /// Reads rejected by an empty ring buffer
    underflows: AtomicU64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_callback(&self) {
        self.callbacks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_overflow(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_underflow(&self) {
        self.underflows.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            callbacks: self.callbacks.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            underflows: self.underflows.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStatsSnapshot {
    pub callbacks: u64,
    pub frames: u64,
    pub overflows: u64,
    pub underflows: u64,
}

impl std::ops::Add for EngineStatsSnapshot {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            callbacks: self.callbacks + other.callbacks,
            frames: self.frames + other.frames,
            overflows: self.overflows + other.overflows,
            underflows: self.underflows + other.underflows,
        }
    }
}
