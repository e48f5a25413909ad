//! Submission accounting
//!
//! Lock-free counters shared across concurrent submissions; they carry
//! no coordination state, only tallies. Snapshot for export or test
//! assertions.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Atomic tallies for one coordinator's lifetime
#[derive(Debug)]
pub struct SubmitterMetrics {
    submissions: AtomicU64,
    confirmed: AtomicU64,
    rejected: AtomicU64,
    timeouts: AtomicU64,
    cancellations: AtomicU64,
    connection_failures: AtomicU64,
    reconnects: AtomicU64,
    status_polls: AtomicU64,
    inflight: AtomicU64,
    last_confirmation: RwLock<Option<Instant>>,
}

impl SubmitterMetrics {
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            confirmed: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            cancellations: AtomicU64::new(0),
            connection_failures: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
            status_polls: AtomicU64::new(0),
            inflight: AtomicU64::new(0),
            last_confirmation: RwLock::new(None),
        }
    }

    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_confirmed(&self) {
        self.confirmed.fetch_add(1, Ordering::Relaxed);
        *self.last_confirmation.write() = Some(Instant::now());
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connection_failure(&self) {
        self.connection_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_poll(&self) {
        self.status_polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inflight_inc(&self) {
        self.inflight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inflight_dec(&self) {
        self.inflight.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn inflight(&self) -> u64 {
        self.inflight.load(Ordering::Relaxed)
    }

    /// Fraction of finished submissions that confirmed (1.0 when none ran)
    pub fn success_rate(&self) -> f64 {
        let total = self.submissions.load(Ordering::Relaxed);
        if total == 0 {
            return 1.0;
        }
        self.confirmed.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn time_since_last_confirmation(&self) -> Option<std::time::Duration> {
        self.last_confirmation.read().map(|at| at.elapsed())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submissions: self.submissions.load(Ordering::Relaxed),
            confirmed: self.confirmed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            connection_failures: self.connection_failures.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            status_polls: self.status_polls.load(Ordering::Relaxed),
            inflight: self.inflight.load(Ordering::Relaxed),
        }
    }
}

impl Default for SubmitterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub submissions: u64,
    pub confirmed: u64,
    pub rejected: u64,
    pub timeouts: u64,
    pub cancellations: u64,
    pub connection_failures: u64,
    pub reconnects: u64,
    pub status_polls: u64,
    pub inflight: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let m = SubmitterMetrics::new();
        m.record_submission();
        m.record_submission();
        m.record_confirmed();
        m.record_rejected();
        m.record_poll();
        m.record_poll();
        m.record_poll();

        let snap = m.snapshot();
        assert_eq!(snap.submissions, 2);
        assert_eq!(snap.confirmed, 1);
        assert_eq!(snap.rejected, 1);
        assert_eq!(snap.status_polls, 3);
    }

    #[test]
    fn test_inflight_gauge() {
        let m = SubmitterMetrics::new();
        m.inflight_inc();
        m.inflight_inc();
        assert_eq!(m.inflight(), 2);
        m.inflight_dec();
        assert_eq!(m.inflight(), 1);
    }

    #[test]
    fn test_success_rate() {
        let m = SubmitterMetrics::new();
        assert_eq!(m.success_rate(), 1.0);

        m.record_submission();
        m.record_submission();
        m.record_confirmed();
        assert_eq!(m.success_rate(), 0.5);
    }

    #[test]
    fn test_last_confirmation_tracked() {
        let m = SubmitterMetrics::new();
        assert!(m.time_since_last_confirmation().is_none());
        m.record_confirmed();
        assert!(m.time_since_last_confirmation().is_some());
    }
}
