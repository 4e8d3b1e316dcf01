//! Change set produced by one snapshot comparison.

use alloc::vec::Vec;
use rowwatch_core::Row;

/// The rows found in a newer snapshot but not in the older one.
///
/// Rows keep the iteration order of the newer snapshot. Repeated row values
/// appear once per surplus occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    rows: Vec<Row>,
}

impl ChangeSet {
    /// Creates a new empty change set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change set from already-computed changed rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Returns the number of changed rows.
    #[inline]
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the changed rows.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns true if there are no changes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds a changed row.
    #[inline]
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    #[inline]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl IntoIterator for ChangeSet {
    type Item = Row;
    type IntoIter = alloc::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use rowwatch_core::row;

    #[test]
    fn test_change_set_new() {
        let cs = ChangeSet::new();
        assert!(cs.is_empty());
        assert_eq!(cs.count(), 0);
    }

    #[test]
    fn test_change_set_push() {
        let mut cs = ChangeSet::new();
        cs.push(row!["1", "a"]);
        cs.push(row!["1", "a"]);

        assert!(!cs.is_empty());
        assert_eq!(cs.count(), 2);
        assert_eq!(cs.iter().count(), 2);
    }

    #[test]
    fn test_change_set_into_rows_keeps_order() {
        let cs = ChangeSet::from_rows(vec![row![2i64], row![1i64]]);
        assert_eq!(cs.clone().into_rows(), vec![row![2i64], row![1i64]]);
        let collected: Vec<Row> = cs.into_iter().collect();
        assert_eq!(collected[0], row![2i64]);
    }
}
