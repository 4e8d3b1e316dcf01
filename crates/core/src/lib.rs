//! rowwatch core - value, row and snapshot types.
//!
//! This crate provides the data model shared by the rowwatch crates:
//!
//! - `DataType`: Cell data types (Boolean, Int32, Int64, Float64, String, DateTime, Bytes)
//! - `Value`: A single cell with strict, hashable equality
//! - `Row`: An ordered sequence of values compared purely by value
//! - `TabularSnapshot`: A fully materialized query result
//! - `Error`: Error types for snapshot construction
//!
//! # Example
//!
//! ```rust
//! use rowwatch_core::{row, TabularSnapshot, Value};
//!
//! let mut snapshot = TabularSnapshot::new(["id", "name"]);
//! snapshot.push(row!["1", "a"]).unwrap();
//! snapshot.push(row!["2", "b"]).unwrap();
//!
//! assert_eq!(snapshot.len(), 2);
//! assert_eq!(snapshot.rows()[1].get(1), Some(&Value::String("b".into())));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod row;
mod snapshot;
mod types;
mod value;

pub use error::{Error, Result};
pub use row::Row;
pub use snapshot::TabularSnapshot;
pub use types::DataType;
pub use value::Value;

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec;
}
