//! The poll loop.
//!
//! A `PollWorker` owns everything one polling session needs: the connection
//! gate, the snapshot source, the double buffer, and its own stop flag. It
//! runs on a dedicated thread; one cycle is
//! connect -> capture -> diff -> notify -> sleep.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rowwatch_diff::diff;
use rowwatch_reactive::{ChangeNotifier, Delivery};
use tracing::{debug, info, warn};

use crate::buffer::SnapshotBuffer;
use crate::connection::ConnectionGate;
use crate::error::{Error, ErrorCategory};
use crate::source::SnapshotSource;
use crate::stats::PollStats;

/// Longest uninterrupted sleep; the stop flag is re-checked between slices.
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Smallest base delay used when backing off from a zero interval.
const BACKOFF_FLOOR: Duration = Duration::from_millis(10);

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No connection could be opened; snapshots untouched.
    ConnectionFailed,
    /// The query failed; snapshots untouched.
    QueryFailed,
    /// First capture of the session, stored without comparing.
    Baseline { rows: usize },
    /// Captured and compared, nothing new.
    Unchanged,
    /// Changed rows were found and delivered.
    Changed { count: usize, delivery: Delivery },
    /// Changed rows were found but stop was requested before delivery.
    Stopped,
}

/// One polling session.
pub struct PollWorker {
    gate: ConnectionGate,
    source: SnapshotSource,
    notifier: ChangeNotifier,
    stats: Arc<PollStats>,
    stop: Arc<AtomicBool>,
    interval: Duration,
    backoff_max: Option<Duration>,
    buffer: SnapshotBuffer,
    consecutive_failures: u32,
}

impl PollWorker {
    pub fn new(
        gate: ConnectionGate,
        source: SnapshotSource,
        notifier: ChangeNotifier,
        stats: Arc<PollStats>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self {
            gate,
            source,
            notifier,
            stats,
            stop,
            interval: Duration::ZERO,
            backoff_max: None,
            buffer: SnapshotBuffer::new(),
            consecutive_failures: 0,
        }
    }

    /// Set the delay between cycles
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Enable exponential backoff capped at `max` after consecutive failures
    pub fn with_backoff_max(mut self, max: Option<Duration>) -> Self {
        self.backoff_max = max;
        self
    }

    #[inline]
    pub fn buffer(&self) -> &SnapshotBuffer {
        &self.buffer
    }

    #[inline]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Runs one cycle without sleeping.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.stats.record_cycle();

        let connection = match self.gate.open() {
            Ok(connection) => connection,
            Err(e) => {
                self.on_failure(&e);
                return CycleOutcome::ConnectionFailed;
            }
        };

        let snapshot = match self.source.capture(connection) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.on_failure(&e);
                return CycleOutcome::QueryFailed;
            }
        };

        self.on_success();
        self.stats.record_snapshot();

        let rows = snapshot.len();
        let changes = match self.buffer.rotate(snapshot) {
            Some((previous, current)) => diff(previous, current),
            None => {
                debug!(rows, "baseline snapshot stored");
                return CycleOutcome::Baseline { rows };
            }
        };

        if changes.is_empty() {
            return CycleOutcome::Unchanged;
        }
        if self.is_stopped() {
            debug!(count = changes.count(), "stop requested, dropping notification");
            return CycleOutcome::Stopped;
        }

        let delivery = self.notifier.notify(&changes);
        self.stats
            .record_notification(changes.count(), delivery.failed.len());
        debug!(
            count = changes.count(),
            delivered = delivery.delivered,
            "changes delivered"
        );

        CycleOutcome::Changed {
            count: changes.count(),
            delivery,
        }
    }

    /// Delay before the next cycle.
    ///
    /// The configured interval, unless backoff is enabled and the last
    /// cycles failed.
    pub fn next_delay(&self) -> Duration {
        match self.backoff_max {
            Some(max) if self.consecutive_failures > 0 => {
                let base = self.interval.max(BACKOFF_FLOOR);
                let exponent = (self.consecutive_failures - 1).min(16);
                base.saturating_mul(1u32 << exponent)
                    .min(max.max(self.interval))
            }
            _ => self.interval,
        }
    }

    /// Runs cycles until the stop flag is set.
    pub fn run(mut self) {
        info!(
            query = self.source.query(),
            interval_ms = self.interval.as_millis() as u64,
            "polling started"
        );

        while !self.is_stopped() {
            match panic::catch_unwind(AssertUnwindSafe(|| self.run_cycle())) {
                Ok(outcome) => debug!(?outcome, "poll cycle finished"),
                Err(_) => {
                    // A driver panicked mid-cycle. Treat it like a failed query.
                    let e = Error::QueryFailure {
                        message: "data source panicked".to_string(),
                        query: Some(self.source.query().to_string()),
                        source: None,
                    };
                    self.on_failure(&e);
                }
            }
            self.sleep(self.next_delay());
        }

        info!(query = self.source.query(), "polling stopped");
    }

    fn sleep(&self, delay: Duration) {
        let mut remaining = delay;
        while remaining > Duration::ZERO && !self.is_stopped() {
            let step = remaining.min(SLEEP_SLICE);
            thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
    }

    fn on_failure(&mut self, error: &Error) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        let message = error_chain(error);
        match error.category() {
            ErrorCategory::Connection => self.stats.record_connection_failure(message.clone()),
            _ => self.stats.record_query_failure(message.clone()),
        }

        if self.consecutive_failures == 1 {
            warn!(error = %message, "poll cycle failed, retrying next cycle");
        } else {
            debug!(
                error = %message,
                failures = self.consecutive_failures,
                "poll cycle failed again"
            );
        }
    }

    fn on_success(&mut self) {
        if self.consecutive_failures > 0 {
            info!(
                failures = self.consecutive_failures,
                "data source reachable again"
            );
            self.consecutive_failures = 0;
        }
    }
}

/// Renders an error and its sources as `outer: inner: ...`.
fn error_chain(error: &Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
