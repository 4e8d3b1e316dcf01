//! Tabular snapshots.
//!
//! A `TabularSnapshot` is one fully materialized query result: the column
//! names reported by the data source plus the rows in the order they were
//! read. It holds no reference to the connection it came from.

use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::Value;
use alloc::string::String;
use alloc::vec::Vec;

/// A materialized query result.
///
/// When column names are declared, every row must have exactly that many
/// cells. A snapshot without declared columns accepts rows of any width.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabularSnapshot {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TabularSnapshot {
    /// Creates an empty snapshot with the given column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Creates a snapshot without column names.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            columns: Vec::new(),
            rows,
        }
    }

    /// Creates a snapshot with column names, checking every row's width.
    pub fn with_rows<I, S>(columns: I, rows: Vec<Row>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut snapshot = Self::new(columns);
        snapshot.rows.reserve(rows.len());
        for row in rows {
            snapshot.push(row)?;
        }
        Ok(snapshot)
    }

    /// Appends a row.
    pub fn push(&mut self, row: Row) -> Result<()> {
        if !self.columns.is_empty() && row.len() != self.columns.len() {
            return Err(Error::arity_mismatch(self.columns.len(), row.len()));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Keeps only the rows for which `keep` returns true, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Returns the declared column names.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Result<Option<&Value>> {
        let index = self
            .column_index(column)
            .ok_or_else(|| Error::column_not_found(column))?;
        Ok(self.rows.get(row).and_then(|r| r.get(index)))
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a TabularSnapshot {
    type Item = &'a Row;
    type IntoIter = core::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
