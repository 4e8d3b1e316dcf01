//! Property-based tests for rowwatch-diff using proptest.

use proptest::prelude::*;
use rowwatch_core::{Row, TabularSnapshot, Value};
use rowwatch_diff::{diff, diff_rows};

fn arb_row() -> impl Strategy<Value = Row> {
    (0i64..20, "[a-d]{1,2}").prop_map(|(id, name)| Row::new(vec![Value::Int64(id), Value::String(name)]))
}

fn arb_rows(max: usize) -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(arb_row(), 0..max)
}

proptest! {
    /// Any permutation of the same multiset compares as unchanged.
    #[test]
    fn permuted_snapshot_has_no_changes(
        (rows, shuffled) in arb_rows(60).prop_flat_map(|rows| {
            let shuffled = Just(rows.clone()).prop_shuffle();
            (Just(rows), shuffled)
        })
    ) {
        let older = TabularSnapshot::from_rows(rows);
        let newer = TabularSnapshot::from_rows(shuffled);
        prop_assert!(diff(&older, &newer).is_empty());
    }

    /// Appending rows absent from the base reports exactly those rows.
    #[test]
    fn appended_rows_are_reported_exactly(
        base in arb_rows(40),
        extra in prop::collection::vec(100i64..200, 1..10)
    ) {
        // Ids >= 100 never occur in `base`.
        let appended: Vec<Row> = extra
            .iter()
            .map(|id| Row::new(vec![Value::Int64(*id), Value::String("new".into())]))
            .collect();

        let mut newer = base.clone();
        newer.extend(appended.iter().cloned());

        let changes = diff_rows(&base, &newer);
        prop_assert_eq!(changes.count(), appended.len());
        prop_assert_eq!(changes.rows(), appended.as_slice());
    }

    /// Dropping rows from the base is never reported.
    #[test]
    fn removed_rows_are_not_reported(
        base in arb_rows(60),
        keep in prop::collection::vec(any::<bool>(), 60)
    ) {
        let newer: Vec<Row> = base
            .iter()
            .zip(keep.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();

        prop_assert!(diff_rows(&base, &newer).is_empty());
    }

    /// Every reported row occurs in `newer` more often than in `older`.
    #[test]
    fn reported_rows_are_surplus(older in arb_rows(40), newer in arb_rows(40)) {
        let changes = diff_rows(&older, &newer);
        prop_assert!(changes.count() <= newer.len());
        for row in changes.rows() {
            let in_newer = newer.iter().filter(|r| *r == row).count();
            let in_older = older.iter().filter(|r| *r == row).count();
            let reported = changes.rows().iter().filter(|r| *r == row).count();
            prop_assert_eq!(reported, in_newer.saturating_sub(in_older));
        }
    }
}
