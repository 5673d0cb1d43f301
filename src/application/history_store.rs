// History store - bounded newest-first sequence of readings, replaced wholesale
use std::sync::Arc;

use crate::domain::reading::Reading;

pub const MAX_HISTORY: usize = 1000;

/// Readers take a snapshot (`Arc<[Reading]>`) and never observe a partially
/// applied refresh.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    readings: Arc<[Reading]>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl HistoryStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: Arc::from(Vec::new()),
            capacity,
        }
    }

    /// Swap in a fresh newest-first sequence, keeping at most `capacity` rows.
    pub fn replace_all(&mut self, mut readings: Vec<Reading>) {
        readings.truncate(self.capacity);
        self.readings = Arc::from(readings);
    }

    pub fn clear(&mut self) {
        self.readings = Arc::from(Vec::new());
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn snapshot(&self) -> Arc<[Reading]> {
        Arc::clone(&self.readings)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(n: usize) -> Vec<Reading> {
        (0..n)
            .map(|i| Reading::new(20.0, 50.0, i as f64, "normal").with_id(i as i64))
            .collect()
    }

    #[test]
    fn test_empty_store_has_no_latest() {
        let store = HistoryStore::default();
        assert!(store.latest().is_none());
        assert!(store.is_empty());
        assert_eq!(store.capacity(), MAX_HISTORY);
    }

    #[test]
    fn test_latest_is_first_element() {
        let mut store = HistoryStore::default();
        store.replace_all(readings(3));
        assert_eq!(store.latest().and_then(|r| r.id), Some(0));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_replace_all_is_not_a_merge() {
        let mut store = HistoryStore::default();
        store.replace_all(readings(5));
        store.replace_all(readings(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_all_truncates_to_capacity() {
        let mut store = HistoryStore::with_capacity(4);
        store.replace_all(readings(10));
        assert_eq!(store.len(), 4);
        assert_eq!(store.readings().last().and_then(|r| r.id), Some(3));
    }

    #[test]
    fn test_snapshot_survives_replacement() {
        let mut store = HistoryStore::default();
        store.replace_all(readings(3));
        let snapshot = store.snapshot();
        store.clear();
        assert_eq!(snapshot.len(), 3);
        assert!(store.is_empty());
    }
}
