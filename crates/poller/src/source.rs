//! Snapshot capture.
//!
//! `SnapshotSource` runs the fixed query over one connection and hands back a
//! fully materialized snapshot. The connection is released as soon as the
//! query has run, whether or not it succeeded.

use std::sync::Arc;

use rowwatch_core::TabularSnapshot;
use tracing::debug;

use crate::connection::{Connection, ConnectionGate};
use crate::error::{Error, Result};

/// Executes one fixed query per capture.
#[derive(Clone, Debug)]
pub struct SnapshotSource {
    query: Arc<str>,
}

impl SnapshotSource {
    /// Creates a source for `query`, rejecting blank query text.
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::invalid_configuration("query text must not be empty"));
        }
        Ok(Self {
            query: query.into(),
        })
    }

    /// Returns the query text.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Runs the query on `connection`, then releases it.
    pub fn capture(&self, mut connection: Box<dyn Connection>) -> Result<TabularSnapshot> {
        let result = connection.query(&self.query);

        if let Err(e) = connection.close() {
            // The result is already fully materialized; a failed release does
            // not invalidate it.
            debug!(error = %e, "connection close failed");
        }

        result.map_err(|e| Error::query_with_source("query execution failed", &*self.query, e))
    }

    /// Opens a connection through `gate` and captures one snapshot over it.
    pub fn capture_with(&self, gate: &ConnectionGate) -> Result<TabularSnapshot> {
        let connection = gate.open()?;
        self.capture(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionDescriptor, Connector};
    use crate::error::{DriverResult, ErrorCategory};
    use rowwatch_core::row;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        fail: bool,
        closed: Arc<AtomicUsize>,
    }

    impl Connection for Probe {
        fn query(&mut self, query: &str) -> DriverResult<TabularSnapshot> {
            if self.fail {
                return Err(format!("cannot run {}", query).into());
            }
            Ok(TabularSnapshot::from_rows(vec![row!["1", "a"]]))
        }

        fn close(self: Box<Self>) -> DriverResult<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn probe(fail: bool, closed: &Arc<AtomicUsize>) -> Box<dyn Connection> {
        Box::new(Probe {
            fail,
            closed: closed.clone(),
        })
    }

    #[test]
    fn test_blank_query_is_rejected() {
        assert!(SnapshotSource::new("").is_err());
        assert!(SnapshotSource::new("   ").is_err());
        assert_eq!(
            SnapshotSource::new("SELECT * FROM t").unwrap().query(),
            "SELECT * FROM t"
        );
    }

    #[test]
    fn test_capture_closes_on_success() {
        let closed = Arc::new(AtomicUsize::new(0));
        let source = SnapshotSource::new("SELECT * FROM t").unwrap();

        let snapshot = source.capture(probe(false, &closed)).unwrap();
        assert_eq!(snapshot.rows(), &[row!["1", "a"]]);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capture_closes_on_failure() {
        let closed = Arc::new(AtomicUsize::new(0));
        let source = SnapshotSource::new("SELECT * FROM t").unwrap();

        let err = source.capture(probe(true, &closed)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Query);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        match err {
            Error::QueryFailure { query, source, .. } => {
                assert_eq!(query.as_deref(), Some("SELECT * FROM t"));
                assert_eq!(source.unwrap().to_string(), "cannot run SELECT * FROM t");
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_capture_with_gate() {
        let closed = Arc::new(AtomicUsize::new(0));
        let closed_clone = closed.clone();
        let connector: Arc<dyn Connector> = Arc::new(
            move |_: &ConnectionDescriptor| -> DriverResult<Box<dyn Connection>> {
                Ok(probe(false, &closed_clone))
            },
        );
        let gate = ConnectionGate::new("mem", connector).unwrap();
        let source = SnapshotSource::new("SELECT * FROM t").unwrap();

        assert_eq!(source.capture_with(&gate).unwrap().len(), 1);
        assert_eq!(source.capture_with(&gate).unwrap().len(), 1);
        // One connection per capture, each released.
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }
}
