//! Shared worker counters.
//!
//! Every guild worker created by one registry bumps the same counters, so
//! the totals describe the whole process.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for queue and execution outcomes.
#[derive(Debug, Default)]
pub struct WorkerStats {
    queued: AtomicU64,
    dropped: AtomicU64,
    executed: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

/// Point-in-time copy of [`WorkerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatsSnapshot {
    /// Tasks accepted into a queue.
    pub queued: u64,
    /// Tasks rejected because the queue was full or closing.
    pub dropped: u64,
    /// Tasks whose action ran, successfully or not.
    pub executed: u64,
    /// Executed tasks whose action failed or panicked.
    pub failed: u64,
    /// Tasks still queued at stop time and thrown away.
    pub discarded: u64,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_executed(&self, failed: bool) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            queued: self.queued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
        }
    }
}
