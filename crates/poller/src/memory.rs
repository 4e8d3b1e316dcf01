//! In-process data source.
//!
//! `MemoryConnector` serves queries from named tables held in memory. It is
//! the loopback driver used by the test suite and by embedders that want to
//! feed rowwatch from their own process. Faults can be scripted: refusing a
//! number of upcoming connections, failing a number of upcoming queries, or
//! taking the whole source offline.
//!
//! Queries name a table either as `SELECT ... FROM <table>` or as the bare
//! table name.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use rowwatch_core::{Row, TabularSnapshot};
use thiserror::Error;

use crate::connection::{Connection, ConnectionDescriptor, Connector};
use crate::error::DriverResult;

/// Errors raised by the in-memory driver.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("data source is offline")]
    Offline,
    #[error("connection refused")]
    Refused,
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),
    #[error("injected query failure")]
    InjectedFailure,
    #[error(transparent)]
    Snapshot(#[from] rowwatch_core::Error),
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, TabularSnapshot>,
    offline: bool,
    refuse_connects: usize,
    fail_queries: usize,
    connect_attempts: u64,
    open_connections: usize,
}

/// A cloneable handle to an in-memory set of tables.
///
/// Clones share the same tables and fault settings.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        lock(&self.state)
    }

    /// Replaces (or creates) a table.
    pub fn set_table(&self, name: impl Into<String>, snapshot: TabularSnapshot) {
        self.state().tables.insert(name.into(), snapshot);
    }

    /// Creates an empty table with the given columns.
    pub fn create_table<I, S>(&self, name: impl Into<String>, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_table(name, TabularSnapshot::new(columns));
    }

    /// Appends a row to a table.
    pub fn insert(&self, table: &str, row: Row) -> Result<(), MemoryError> {
        let mut state = self.state();
        let snapshot = state
            .tables
            .get_mut(table)
            .ok_or_else(|| MemoryError::TableNotFound(table.to_string()))?;
        snapshot.push(row)?;
        Ok(())
    }

    /// Removes every row equal to `row`. Returns how many were removed.
    pub fn delete(&self, table: &str, row: &Row) -> Result<usize, MemoryError> {
        let mut state = self.state();
        let snapshot = state
            .tables
            .get_mut(table)
            .ok_or_else(|| MemoryError::TableNotFound(table.to_string()))?;
        let before = snapshot.len();
        snapshot.retain(|r| r != row);
        Ok(before - snapshot.len())
    }

    /// Returns a copy of a table's current contents.
    pub fn table(&self, name: &str) -> Option<TabularSnapshot> {
        self.state().tables.get(name).cloned()
    }

    /// Makes every connection attempt fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Refuses the next `n` connection attempts.
    pub fn fail_next_connects(&self, n: usize) {
        self.state().refuse_connects = n;
    }

    /// Fails the next `n` queries.
    pub fn fail_next_queries(&self, n: usize) {
        self.state().fail_queries = n;
    }

    /// Number of `connect` calls so far, failed ones included.
    pub fn connect_attempts(&self) -> u64 {
        self.state().connect_attempts
    }

    /// Number of connections currently open.
    pub fn open_connections(&self) -> usize {
        self.state().open_connections
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, _descriptor: &ConnectionDescriptor) -> DriverResult<Box<dyn Connection>> {
        let mut state = self.state();
        state.connect_attempts += 1;

        if state.offline {
            return Err(MemoryError::Offline.into());
        }
        if state.refuse_connects > 0 {
            state.refuse_connects -= 1;
            return Err(MemoryError::Refused.into());
        }

        state.open_connections += 1;
        Ok(Box::new(MemoryConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
}

impl Connection for MemoryConnection {
    fn query(&mut self, query: &str) -> DriverResult<TabularSnapshot> {
        let mut state = lock(&self.state);
        if state.fail_queries > 0 {
            state.fail_queries -= 1;
            return Err(MemoryError::InjectedFailure.into());
        }

        let table = table_name(query)?;
        state
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| MemoryError::TableNotFound(table.to_string()).into())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.open_connections = state.open_connections.saturating_sub(1);
    }
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Extracts the table a query reads from.
fn table_name(query: &str) -> Result<&str, MemoryError> {
    let mut tokens = query.split_whitespace();
    let mut only = None;
    let mut count = 0;

    while let Some(token) = tokens.next() {
        count += 1;
        if token.eq_ignore_ascii_case("from") {
            return tokens
                .next()
                .map(|t| t.trim_end_matches(';'))
                .filter(|t| !t.is_empty())
                .ok_or_else(|| MemoryError::UnsupportedQuery(query.to_string()));
        }
        only = Some(token);
    }

    match (count, only) {
        (1, Some(name)) => Ok(name.trim_end_matches(';')),
        _ => Err(MemoryError::UnsupportedQuery(query.to_string())),
    }
}
