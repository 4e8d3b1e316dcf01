//! Row structure for rowwatch snapshots.
//!
//! A `Row` has no identity of its own: two rows are equal iff every
//! corresponding cell is equal.

use crate::value::Value;
use alloc::vec::Vec;
use core::fmt;

/// One row of a query result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Row {
    /// Values stored in this row, indexed by column position.
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from its cell values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns a reference to the values.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row and returns its values.
    #[inline]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Gets a value at the given column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Returns the number of values in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl<V: Into<Value>> FromIterator<V> for Row {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str(")")
    }
}

/// Builds a [`Row`] from a list of expressions convertible into [`Value`].
///
/// ```rust
/// use rowwatch_core::{row, Value};
///
/// let r = row!["1", "a"];
/// assert_eq!(r.get(0), Some(&Value::String("1".into())));
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::Row::default() };
    ($($value:expr),+ $(,)?) => {
        $crate::Row::new($crate::__private::vec![$($crate::Value::from($value)),+])
    };
}
