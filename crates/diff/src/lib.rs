//! rowwatch diff - snapshot comparison.
//!
//! Compares two materialized query results and reports the rows of the newer
//! one that the older one does not contain.
//!
//! - `ChangeSet`: the changed rows of one comparison, in the newer snapshot's order
//! - `diff` / `diff_rows`: the multiset difference `newer - older`
//!
//! Rows are compared purely by value. Inserted rows and updated rows surface
//! identically; rows that disappeared are not reported.
//!
//! # Example
//!
//! ```rust
//! use rowwatch_core::{row, TabularSnapshot};
//! use rowwatch_diff::diff;
//!
//! let older = TabularSnapshot::from_rows(vec![row!["1", "a"], row!["2", "b"]]);
//! let newer = TabularSnapshot::from_rows(vec![row!["1", "a"], row!["2", "b"], row!["3", "c"]]);
//!
//! let changes = diff(&older, &newer);
//! assert_eq!(changes.count(), 1);
//! assert_eq!(changes.rows(), &[row!["3", "c"]]);
//! ```

#![no_std]

extern crate alloc;

pub mod change_set;
mod diff;

pub use change_set::ChangeSet;
pub use diff::{diff, diff_rows};
