//! Key-indexed result store
//!
//! Holds at most one record per [`RecordKey`] plus the order in which keys
//! were first inserted. The order list is what the split-merge pipeline
//! partitions, since hash map iteration order is unspecified.

use ahash::AHashMap;
use propdedup_formats::{PropertyRecord, RecordKey};
use std::mem;

/// Result of [`ResultStore::try_insert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The key was absent and the record was stored
    Fresh,
    /// The key was already present; the store is untouched and the
    /// rejected record is handed back
    Duplicate(PropertyRecord),
}

impl Insertion {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Insertion::Fresh)
    }
}

/// Mapping from key to record with first-insertion order
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    records: AHashMap<RecordKey, PropertyRecord>,
    order: Vec<RecordKey>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the record if its key is absent
    pub fn try_insert(&mut self, record: PropertyRecord) -> Insertion {
        if self.records.contains_key(&record.key) {
            return Insertion::Duplicate(record);
        }
        self.order.push(record.key.clone());
        self.records.insert(record.key.clone(), record);
        Insertion::Fresh
    }

    /// Overwrite the record stored under the same key, returning the old one
    ///
    /// The key keeps its original position. If the key is absent the record
    /// is inserted fresh and `None` is returned.
    pub fn replace(&mut self, record: PropertyRecord) -> Option<PropertyRecord> {
        match self.records.get_mut(&record.key) {
            Some(slot) => Some(mem::replace(slot, record)),
            None => {
                self.try_insert(record);
                None
            }
        }
    }

    /// Remove the record for `key`, compacting the order list
    pub fn remove(&mut self, key: &RecordKey) -> Option<PropertyRecord> {
        let removed = self.records.remove(key)?;
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        Some(removed)
    }

    pub fn get(&self, key: &RecordKey) -> Option<&PropertyRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys in first-insertion order
    pub fn keys(&self) -> &[RecordKey] {
        &self.order
    }

    /// Records in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyRecord> + '_ {
        self.order.iter().filter_map(move |key| self.records.get(key))
    }

    /// Consume the store, returning records in first-insertion order
    pub fn into_records(mut self) -> Vec<PropertyRecord> {
        self.order
            .iter()
            .filter_map(|key| self.records.remove(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, date: &str, address: &str) -> PropertyRecord {
        PropertyRecord::new(RecordKey::new(id, date), address, "X", "500000")
    }

    #[test]
    fn test_try_insert() {
        let mut store = ResultStore::new();

        assert!(store.try_insert(record(1, "2020", "A")).is_fresh());
        assert_eq!(
            store.try_insert(record(1, "2020", "B")),
            Insertion::Duplicate(record(1, "2020", "B"))
        );
        assert!(store.try_insert(record(1, "2021", "C")).is_fresh());

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&RecordKey::new(1, "2020")).unwrap().address, "A");
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut store = ResultStore::new();
        store.try_insert(record(1, "2020", "A"));
        store.try_insert(record(2, "2020", "B"));

        let old = store.replace(record(1, "2020", "Z"));
        assert_eq!(old.unwrap().address, "A");

        let addresses: Vec<_> = store.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(addresses, vec!["Z", "B"]);
    }

    #[test]
    fn test_replace_absent_inserts() {
        let mut store = ResultStore::new();
        assert!(store.replace(record(1, "2020", "A")).is_none());
        assert_eq!(store.keys(), &[RecordKey::new(1, "2020")]);
    }

    #[test]
    fn test_remove_compacts_order() {
        let mut store = ResultStore::new();
        store.try_insert(record(1, "2020", "A"));
        store.try_insert(record(2, "2020", "B"));
        store.try_insert(record(3, "2020", "C"));

        assert!(store.remove(&RecordKey::new(2, "2020")).is_some());
        assert!(store.remove(&RecordKey::new(2, "2020")).is_none());

        assert_eq!(
            store.keys(),
            &[RecordKey::new(1, "2020"), RecordKey::new(3, "2020")]
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_order_matches_contents() {
        let mut store = ResultStore::new();
        for i in 0..10 {
            store.try_insert(record(i, "2020", "A"));
        }
        for i in (0..10).step_by(3) {
            store.remove(&RecordKey::new(i, "2020"));
        }

        assert_eq!(store.keys().len(), store.len());
        assert!(store.keys().iter().all(|k| store.contains(k)));
    }

    #[test]
    fn test_into_records_in_order() {
        let mut store = ResultStore::new();
        store.try_insert(record(3, "2020", "C"));
        store.try_insert(record(1, "2020", "A"));

        let ids: Vec<_> = store.into_records().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
