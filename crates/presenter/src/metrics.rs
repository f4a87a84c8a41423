//! Mailbox metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the sensor callback and the control loop
#[derive(Debug, Default)]
pub struct MailboxMetrics {
    received: AtomicU64,
    decode_failed: AtomicU64,
    /// Frames replaced before the control loop read them
    overwritten: AtomicU64,
    taken: AtomicU64,
    recorded: AtomicU64,
    record_failed: AtomicU64,
}

impl MailboxMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_decode_failed(&self) {
        self.decode_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_overwritten(&self) {
        self.overwritten.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_taken(&self) {
        self.taken.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_recorded(&self) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_record_failed(&self) {
        self.record_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            decode_failed: self.decode_failed.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
            taken: self.taken.load(Ordering::Relaxed),
            recorded: self.recorded.load(Ordering::Relaxed),
            record_failed: self.record_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of mailbox metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub decode_failed: u64,
    pub overwritten: u64,
    pub taken: u64,
    pub recorded: u64,
    pub record_failed: u64,
}
