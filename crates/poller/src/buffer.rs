//! Double-buffered snapshot storage.

use rowwatch_core::TabularSnapshot;

/// The two snapshot slots owned by the poll worker.
///
/// `current` is the baseline the next capture is compared against;
/// `previous` is the snapshot `current` replaced on the last rotation.
#[derive(Debug, Default)]
pub struct SnapshotBuffer {
    current: Option<TabularSnapshot>,
    previous: Option<TabularSnapshot>,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once a baseline has been stored.
    #[inline]
    pub fn has_baseline(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the snapshot the next capture will be compared against.
    #[inline]
    pub fn baseline(&self) -> Option<&TabularSnapshot> {
        self.current.as_ref()
    }

    #[inline]
    pub fn previous(&self) -> Option<&TabularSnapshot> {
        self.previous.as_ref()
    }

    /// Makes `snapshot` current and moves the old current into `previous`.
    ///
    /// Returns the `(previous, current)` pair to compare, or `None` if there
    /// was no baseline, in which case `snapshot` becomes it.
    pub fn rotate(&mut self, snapshot: TabularSnapshot) -> Option<(&TabularSnapshot, &TabularSnapshot)> {
        self.previous = self.current.replace(snapshot);
        match (&self.previous, &self.current) {
            (Some(previous), Some(current)) => Some((previous, current)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowwatch_core::row;

    fn snap(tag: &str) -> TabularSnapshot {
        TabularSnapshot::from_rows(vec![row![tag]])
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = SnapshotBuffer::new();
        assert!(!buffer.has_baseline());
        assert!(buffer.baseline().is_none());
        assert!(buffer.previous().is_none());
    }

    #[test]
    fn test_rotate_swaps_slots() {
        let mut buffer = SnapshotBuffer::new();
        assert!(buffer.rotate(snap("a")).is_none());

        let (previous, current) = buffer.rotate(snap("b")).unwrap();
        assert_eq!(previous, &snap("a"));
        assert_eq!(current, &snap("b"));

        buffer.rotate(snap("c"));
        assert_eq!(buffer.previous(), Some(&snap("b")));
        assert_eq!(buffer.baseline(), Some(&snap("c")));
    }

    #[test]
    fn test_rotate_without_baseline_stores_it() {
        let mut buffer = SnapshotBuffer::new();
        assert!(buffer.rotate(snap("a")).is_none());
        assert_eq!(buffer.baseline(), Some(&snap("a")));
    }

    #[test]
    fn test_baseline_has_no_previous() {
        let mut buffer = SnapshotBuffer::new();
        buffer.rotate(snap("a"));
        assert!(buffer.has_baseline());
        assert!(buffer.previous().is_none());
    }
}
