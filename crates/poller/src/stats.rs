//! Poll loop statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

/// Counters updated by the poll worker and readable from any thread.
#[derive(Debug, Default)]
pub struct PollStats {
    cycles: AtomicU64,
    snapshots: AtomicU64,
    connection_failures: AtomicU64,
    query_failures: AtomicU64,
    notifications: AtomicU64,
    rows_reported: AtomicU64,
    handler_panics: AtomicU64,
    last_error: Mutex<Option<String>>,
}

/// A point-in-time copy of [`PollStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Poll cycles started
    pub cycles: u64,
    /// Snapshots captured successfully (baselines included)
    pub snapshots: u64,
    /// Cycles skipped because no connection could be opened
    pub connection_failures: u64,
    /// Cycles skipped because the query failed
    pub query_failures: u64,
    /// Change notifications dispatched
    pub notifications: u64,
    /// Changed rows reported across all notifications
    pub rows_reported: u64,
    /// Handler invocations that panicked
    pub handler_panics: u64,
    /// Message of the most recent connection or query failure
    pub last_error: Option<String>,
}

impl StatsSnapshot {
    /// Total failed cycles.
    pub fn failures(&self) -> u64 {
        self.connection_failures + self.query_failures
    }
}

impl PollStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_snapshot(&self) {
        self.snapshots.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_connection_failure(&self, message: String) {
        self.connection_failures.fetch_add(1, Ordering::Relaxed);
        self.set_last_error(message);
    }

    pub(crate) fn record_query_failure(&self, message: String) {
        self.query_failures.fetch_add(1, Ordering::Relaxed);
        self.set_last_error(message);
    }

    pub(crate) fn record_notification(&self, rows: usize, panics: usize) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
        self.rows_reported.fetch_add(rows as u64, Ordering::Relaxed);
        self.handler_panics.fetch_add(panics as u64, Ordering::Relaxed);
    }

    fn set_last_error(&self, message: String) {
        let mut last = self
            .last_error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *last = Some(message);
    }

    /// Copies the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            snapshots: self.snapshots.load(Ordering::Relaxed),
            connection_failures: self.connection_failures.load(Ordering::Relaxed),
            query_failures: self.query_failures.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            rows_reported: self.rows_reported.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = PollStats::new();
        stats.record_cycle();
        stats.record_cycle();
        stats.record_snapshot();
        stats.record_connection_failure("refused".into());
        stats.record_query_failure("syntax".into());
        stats.record_notification(3, 1);

        let snap = stats.snapshot();
        assert_eq!(snap.cycles, 2);
        assert_eq!(snap.snapshots, 1);
        assert_eq!(snap.failures(), 2);
        assert_eq!(snap.notifications, 1);
        assert_eq!(snap.rows_reported, 3);
        assert_eq!(snap.handler_panics, 1);
        assert_eq!(snap.last_error.as_deref(), Some("syntax"));
    }

    #[test]
    fn test_default_is_zero() {
        assert_eq!(PollStats::new().snapshot(), StatsSnapshot::default());
    }
}
