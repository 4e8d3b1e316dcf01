//! Multiset difference between two snapshots.

use crate::change_set::ChangeSet;
use hashbrown::HashMap;
use rowwatch_core::{Row, TabularSnapshot};

/// Returns the rows of `newer` that are not present by value in `older`.
pub fn diff(older: &TabularSnapshot, newer: &TabularSnapshot) -> ChangeSet {
    diff_rows(older.rows(), newer.rows())
}

/// Computes `newer - older` over row multisets.
///
/// Each row value in `older` absorbs one equal occurrence in `newer`; any
/// occurrence beyond that multiplicity is reported. The result follows
/// `newer`'s order. Rows only present in `older` are ignored.
pub fn diff_rows(older: &[Row], newer: &[Row]) -> ChangeSet {
    let mut remaining: HashMap<&Row, usize> = HashMap::with_capacity(older.len());
    for row in older {
        *remaining.entry(row).or_insert(0) += 1;
    }

    let mut changes = ChangeSet::new();
    for row in newer {
        match remaining.get_mut(row) {
            Some(count) if *count > 0 => *count -= 1,
            _ => changes.push(row.clone()),
        }
    }
    changes
}
