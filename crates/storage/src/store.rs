//! Canonical store: one consolidated record per key
//!
//! Iteration order is insertion order of keys; a merge that replaces a
//! record keeps the key's position, a removal closes the gap.

use concord_core::RecordKey;
use indexmap::IndexMap;

/// Key -> canonical record map.
#[derive(Debug, Clone)]
pub struct CanonicalStore<K: RecordKey, T> {
    records: IndexMap<K, T>,
}

impl<K: RecordKey, T> Default for CanonicalStore<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RecordKey, T> CanonicalStore<K, T> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }

    /// Get the canonical record for a key
    pub fn get(&self, key: &K) -> Option<&T> {
        self.records.get(key)
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &K) -> bool {
        self.records.contains_key(key)
    }

    /// Insert or replace the record for a key, returning the previous one
    pub fn insert(&mut self, key: K, record: T) -> Option<T> {
        self.records.insert(key, record)
    }

    /// Remove a key, returning its record
    pub fn remove(&mut self, key: &K) -> Option<T> {
        self.records.shift_remove(key)
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.records.keys()
    }

    /// Records in key insertion order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    /// `(key, record)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.records.iter()
    }
}
