//! Public engine surface.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rowwatch_reactive::{ChangeNotifier, ChangeSet, Row, SubscriptionId};
use tracing::{info, warn};

use crate::config::{PollerConfig, DEFAULT_THREAD_NAME};
use crate::connection::{ConnectionDescriptor, ConnectionGate, Connector};
use crate::error::{Error, Result};
use crate::scheduler::PollWorker;
use crate::source::SnapshotSource;
use crate::stats::{PollStats, StatsSnapshot};

/// A running or finished polling session.
struct Session {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Session {
    fn is_running(&self) -> bool {
        !self.stop.load(Ordering::Acquire)
    }
}

/// Watches one query for new or changed rows.
///
/// Construction validates the connection string and query. `start` launches a
/// background thread that re-runs the query every interval and delivers
/// changed rows to the subscribed handlers; `stop` ends the session after the
/// cycle in progress. Handlers stay registered across sessions; each session
/// captures a fresh baseline.
pub struct Engine {
    gate: ConnectionGate,
    source: SnapshotSource,
    notifier: ChangeNotifier,
    stats: Arc<PollStats>,
    default_interval: Duration,
    backoff_max: Option<Duration>,
    thread_name: String,
    session: Mutex<Option<Session>>,
}

impl Engine {
    /// Creates an engine. Fails with `InvalidConfiguration` on an empty
    /// connection string or blank query.
    pub fn new(
        connection_string: impl Into<String>,
        query: impl Into<String>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        Ok(Self {
            gate: ConnectionGate::new(connection_string, connector)?,
            source: SnapshotSource::new(query)?,
            notifier: ChangeNotifier::new(),
            stats: Arc::new(PollStats::new()),
            default_interval: Duration::ZERO,
            backoff_max: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            session: Mutex::new(None),
        })
    }

    /// Creates an engine from a validated config.
    ///
    /// `start` then uses the configured interval.
    pub fn from_config(config: &PollerConfig, connector: Arc<dyn Connector>) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::new(&*config.connection_string, &*config.query, connector)?;
        engine.default_interval = config.poll_interval();
        engine.backoff_max = config.backoff_max();
        engine.thread_name = config.thread_name.clone();
        Ok(engine)
    }

    #[inline]
    pub fn connection_descriptor(&self) -> &ConnectionDescriptor {
        self.gate.descriptor()
    }

    #[inline]
    pub fn query(&self) -> &str {
        self.source.query()
    }

    /// Returns the notifier handlers are registered on.
    #[inline]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Registers a change handler.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeSet) + Send + Sync + 'static,
    {
        self.notifier.subscribe(handler)
    }

    /// Registers a handler taking `(change_count, rows)`.
    pub fn subscribe_rows<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(usize, &[Row]) + Send + Sync + 'static,
    {
        self.notifier.subscribe_rows(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts polling with the default interval (zero unless configured).
    pub fn start(&self) -> Result<()> {
        self.start_with_interval(self.default_interval)
    }

    /// Starts polling, sleeping `interval` between cycles.
    ///
    /// Does nothing if a session is already running. If a stopped session's
    /// thread is still finishing its last cycle, waits for it to exit first so
    /// two cycles never overlap. Fails if called from that thread.
    pub fn start_with_interval(&self, interval: Duration) -> Result<()> {
        loop {
            let mut session = self.session();
            if session.as_ref().is_some_and(Session::is_running) {
                info!(query = self.query(), "start ignored, already polling");
                return Ok(());
            }

            if let Some(handle) = session.as_mut().and_then(|s| s.handle.take()) {
                if handle.thread().id() == thread::current().id() {
                    if let Some(s) = session.as_mut() {
                        s.handle = Some(handle);
                    }
                    return Err(Error::worker(
                        "cannot restart polling from the polling thread",
                    ));
                }

                // Wait for the previous session without holding the lock,
                // then re-check: another caller may have started meanwhile.
                drop(session);
                if handle.join().is_err() {
                    warn!(query = self.query(), "previous polling thread panicked");
                }
                continue;
            }

            let stop = Arc::new(AtomicBool::new(false));
            let worker = PollWorker::new(
                self.gate.clone(),
                self.source.clone(),
                self.notifier.clone(),
                Arc::clone(&self.stats),
                Arc::clone(&stop),
            )
            .with_interval(interval)
            .with_backoff_max(self.backoff_max);

            let handle = thread::Builder::new()
                .name(self.thread_name.clone())
                .spawn(move || worker.run())
                .map_err(|e| Error::worker(format!("failed to spawn polling thread: {}", e)))?;

            *session = Some(Session {
                stop,
                handle: Some(handle),
            });
            return Ok(());
        }
    }

    /// Requests the running session to stop.
    ///
    /// Returns immediately; the worker finishes its current cycle and exits
    /// without starting another. Changes found after the request are dropped,
    /// but a delivery already in progress when `stop` is called completes.
    /// Returns false if nothing was running.
    pub fn stop(&self) -> bool {
        let session = self.session();
        match session.as_ref() {
            Some(s) if !s.stop.swap(true, Ordering::AcqRel) => {
                info!(query = self.query(), "stop requested");
                true
            }
            _ => false,
        }
    }

    /// Returns true while a session is polling.
    pub fn is_running(&self) -> bool {
        self.session().as_ref().is_some_and(Session::is_running)
    }

    /// Waits for the current session's thread to exit.
    ///
    /// Blocks until the session is stopped from elsewhere if it is still
    /// running. Fails if called from the polling thread itself.
    pub fn join(&self) -> Result<()> {
        let handle = match self.session().as_mut().and_then(|s| s.handle.take()) {
            Some(handle) => handle,
            None => return Ok(()),
        };

        if handle.thread().id() == thread::current().id() {
            // Put it back so a later join from another thread still works.
            if let Some(s) = self.session().as_mut() {
                s.handle = Some(handle);
            }
            return Err(Error::worker("cannot join the polling thread from itself"));
        }

        handle
            .join()
            .map_err(|_| Error::worker("polling thread panicked"))
    }

    /// Stops the session and waits for its thread to exit.
    pub fn shutdown(&self) -> Result<()> {
        self.stop();
        self.join()
    }

    /// Returns a copy of the poll statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
        let handle = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
            .and_then(|s| s.handle.take());

        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("descriptor", self.connection_descriptor())
            .field("query", &self.query())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::memory::MemoryConnector;

    fn connector() -> Arc<dyn Connector> {
        Arc::new(MemoryConnector::new())
    }

    #[test]
    fn test_new_rejects_empty_connection_string() {
        let err = Engine::new("", "SELECT * FROM Table", connector()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_new_rejects_blank_query() {
        assert!(Engine::new("DATA SOURCE=test.db", "", connector()).is_err());
    }

    #[test]
    fn test_accessors() {
        let engine = Engine::new("DATA SOURCE=test.db", "SELECT * FROM Table", connector()).unwrap();
        assert_eq!(engine.connection_descriptor().as_str(), "DATA SOURCE=test.db");
        assert_eq!(engine.query(), "SELECT * FROM Table");
        assert!(!engine.is_running());
        assert_eq!(engine.stats(), StatsSnapshot::default());
    }

    #[test]
    fn test_from_config() {
        let config = PollerConfig::new("memory", "SELECT * FROM items")
            .with_poll_interval(Duration::from_millis(5))
            .with_thread_name("items-watch");
        let engine = Engine::from_config(&config, connector()).unwrap();
        assert_eq!(engine.default_interval, Duration::from_millis(5));
        assert_eq!(engine.thread_name, "items-watch");

        assert!(Engine::from_config(&PollerConfig::new("", "SELECT 1"), connector()).is_err());
    }

    #[test]
    fn test_stop_when_idle() {
        let engine = Engine::new("memory", "SELECT * FROM items", connector()).unwrap();
        assert!(!engine.stop());
        assert!(engine.join().is_ok());
    }

    #[test]
    fn test_start_stop_lifecycle() {
        let engine = Engine::new("memory", "SELECT * FROM items", connector()).unwrap();
        engine.start_with_interval(Duration::from_millis(5)).unwrap();
        assert!(engine.is_running());

        // A second start while polling is a no-op.
        engine.start().unwrap();
        assert!(engine.is_running());

        assert!(engine.stop());
        assert!(!engine.is_running());
        assert!(!engine.stop());
        engine.join().unwrap();
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let engine = Engine::new("memory", "SELECT * FROM items", connector()).unwrap();
        let id = engine.subscribe(|_| {});
        engine.subscribe_rows(|_, _| {});
        assert_eq!(engine.notifier().subscription_count(), 2);
        assert!(engine.unsubscribe(id));
        assert_eq!(engine.notifier().subscription_count(), 1);
    }
}
