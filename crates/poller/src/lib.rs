//! rowwatch - change detection for a fixed query by polling.
//!
//! The engine re-runs one query against a tabular data source on a background
//! thread, compares each result with the previous one, and tells subscribers
//! which rows are new or changed.
//!
//! # Modules
//!
//! - `connection`: `ConnectionGate` plus the `Connector` / `Connection` driver traits
//! - `source`: `SnapshotSource`, one scoped connection per capture
//! - `buffer`: the current/previous snapshot slots
//! - `scheduler`: `PollWorker`, the poll loop
//! - `engine`: `Engine`, the public start/stop/subscribe surface
//! - `config`: `PollerConfig`
//! - `stats`: poll counters
//! - `memory`: `MemoryConnector`, an in-process data source
//!
//! Only rows present in the newer result and absent (by value) from the older
//! one are reported. Deleted rows are not.
//!
//! # Example
//!
//! ```rust
//! use rowwatch::{row, Engine, MemoryConnector, TabularSnapshot};
//! use std::sync::{mpsc, Arc};
//! use std::time::Duration;
//!
//! let db = MemoryConnector::new();
//! db.set_table(
//!     "items",
//!     TabularSnapshot::with_rows(["id", "name"], vec![row!["1", "a"], row!["2", "b"]]).unwrap(),
//! );
//!
//! let engine = Engine::new("memory", "SELECT * FROM items", Arc::new(db.clone())).unwrap();
//! let (tx, rx) = mpsc::channel();
//! let tx = std::sync::Mutex::new(tx);
//! engine.subscribe_rows(move |count, rows| {
//!     let _ = tx.lock().unwrap().send((count, rows.to_vec()));
//! });
//!
//! engine.start_with_interval(Duration::from_millis(10)).unwrap();
//! // Give the worker time to store its baseline before changing the table.
//! while engine.stats().snapshots == 0 {
//!     std::thread::sleep(Duration::from_millis(1));
//! }
//! db.insert("items", row!["3", "c"]).unwrap();
//!
//! let (count, rows) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(rows, vec![row!["3", "c"]]);
//!
//! engine.shutdown().unwrap();
//! ```

pub mod buffer;
pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod memory;
pub mod scheduler;
pub mod source;
pub mod stats;

pub use buffer::SnapshotBuffer;
pub use config::PollerConfig;
pub use connection::{Connection, ConnectionDescriptor, ConnectionGate, Connector};
pub use engine::Engine;
pub use error::{DriverError, DriverResult, Error, ErrorCategory, Result};
pub use memory::{MemoryConnector, MemoryError};
pub use scheduler::{CycleOutcome, PollWorker};
pub use source::SnapshotSource;
pub use stats::{PollStats, StatsSnapshot};

// Re-export commonly used types from dependencies
pub use rowwatch_core::{row, Row, TabularSnapshot, Value};
pub use rowwatch_diff::{diff, ChangeSet};
pub use rowwatch_reactive::{ChangeNotifier, Delivery, SubscriptionId};
