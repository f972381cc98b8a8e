//! Secondary lookups for exact-match queries on derived values
//!
//! A lookup maps a value derived from each record (e.g. its location or
//! owner) to the set of keys whose canonical record produces that value,
//! giving O(1) retrieval without scanning the store.
//!
//! # Synchronization
//!
//! Every change to a canonical record must be reported with BOTH
//! snapshots: the record as it was before the change (to find the bucket
//! to evict from) and the record after it (to find the bucket to add to).
//! Eviction is applied before addition. Callers capture the old snapshot
//! before they overwrite the store; re-reading the store afterwards would
//! evict from the wrong bucket.
//!
//! Extraction failures are never fatal: the record is left out of that one
//! lookup and a warning is logged.

use concord_core::{LookupError, LookupKey, RecordKey};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::Arc;

/// Derives the lookup value of a record.
///
/// `Ok(None)` means the record produces no value and is not indexed.
pub type LookupFn<T> = Arc<dyn Fn(&T) -> Result<Option<LookupKey>, LookupError> + Send + Sync>;

/// Secondary index: derived value -> keys
///
/// Keys within a bucket keep the order in which they were added.
#[derive(Debug, Clone)]
pub struct LookupIndex<K: RecordKey> {
    buckets: HashMap<LookupKey, IndexSet<K>>,
}

impl<K: RecordKey> Default for LookupIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: RecordKey> LookupIndex<K> {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }

    /// Add key to the value's bucket
    ///
    /// Creates the bucket if it doesn't exist yet.
    pub fn insert(&mut self, value: LookupKey, key: K) {
        self.buckets.entry(value).or_default().insert(key);
    }

    /// Remove key from the value's bucket
    ///
    /// If the bucket becomes empty it is removed entirely to avoid
    /// accumulating empty sets.
    pub fn remove(&mut self, value: &LookupKey, key: &K) {
        if let Some(keys) = self.buckets.get_mut(value) {
            keys.shift_remove(key);
            if keys.is_empty() {
                self.buckets.remove(value);
            }
        }
    }

    /// Get all keys for a value
    pub fn get(&self, value: &LookupKey) -> Option<&IndexSet<K>> {
        self.buckets.get(value)
    }

    /// Check whether a key sits in a value's bucket
    pub fn contains(&self, value: &LookupKey, key: &K) -> bool {
        self.buckets
            .get(value)
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    /// Check whether a key sits in any bucket
    pub fn references(&self, key: &K) -> bool {
        self.buckets.values().any(|keys| keys.contains(key))
    }

    /// Drop every bucket
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of distinct values indexed
    pub fn len(&self) -> usize {
        self.buckets.len()
    }
}

struct Lookup<T, K: RecordKey> {
    extractor: LookupFn<T>,
    index: LookupIndex<K>,
}

/// Named lookups over one canonical store.
///
/// Owns every lookup's buckets exclusively; callers only see key lists.
pub struct LookupRegistry<T, K: RecordKey> {
    lookups: IndexMap<String, Lookup<T, K>>,
}

impl<T, K: RecordKey> Default for LookupRegistry<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: RecordKey> LookupRegistry<T, K> {
    /// Create a registry with no lookups
    pub fn new() -> Self {
        Self {
            lookups: IndexMap::new(),
        }
    }

    /// Register a lookup and back-fill it from the given records.
    ///
    /// Returns the number of records indexed. Records whose extractor
    /// fails or yields no value are skipped. A blank name is
    /// `Error::InvalidOperation`.
    pub fn create<'a, I>(
        &mut self,
        name: &str,
        extractor: LookupFn<T>,
        records: I,
    ) -> concord_core::Result<usize>
    where
        I: IntoIterator<Item = (&'a K, &'a T)>,
        K: 'a,
        T: 'a,
    {
        if name.trim().is_empty() {
            return Err(concord_core::Error::InvalidOperation(
                "lookup name must not be empty".to_string(),
            ));
        }
        if self.lookups.contains_key(name) {
            return Err(concord_core::Error::DuplicateLookup(name.to_string()));
        }

        let mut index = LookupIndex::new();
        let mut indexed = 0;
        let mut scanned = 0;
        for (key, record) in records {
            scanned += 1;
            if let Some(value) = derive(name, &extractor, key, record) {
                index.insert(value, key.clone());
                indexed += 1;
            }
        }

        tracing::info!(
            target: "concord::lookup",
            lookup = name,
            scanned,
            indexed,
            "Lookup created"
        );

        self.lookups
            .insert(name.to_string(), Lookup { extractor, index });
        Ok(indexed)
    }

    /// Remove a lookup. Returns false if it was not registered.
    pub fn drop_lookup(&mut self, name: &str) -> bool {
        let dropped = self.lookups.shift_remove(name).is_some();
        if dropped {
            tracing::info!(target: "concord::lookup", lookup = name, "Lookup dropped");
        }
        dropped
    }

    /// Registered lookup names, in creation order
    pub fn names(&self) -> Vec<String> {
        self.lookups.keys().cloned().collect()
    }

    /// Check whether a lookup is registered
    pub fn contains(&self, name: &str) -> bool {
        self.lookups.contains_key(name)
    }

    /// Number of registered lookups
    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    /// Check if no lookups are registered
    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }

    /// Read access to one lookup's buckets
    pub fn index(&self, name: &str) -> Option<&LookupIndex<K>> {
        self.lookups.get(name).map(|l| &l.index)
    }

    /// Keys whose record produces `value` under lookup `name`.
    ///
    /// Unknown lookups and unknown values yield an empty list.
    pub fn keys_for(&self, name: &str, value: &LookupKey) -> Vec<K> {
        let Some(lookup) = self.lookups.get(name) else {
            tracing::warn!(target: "concord::lookup", lookup = name, "Lookup does not exist");
            return Vec::new();
        };
        lookup
            .index
            .get(value)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Re-index one key after its record changed.
    ///
    /// `old` is the snapshot taken before the store was overwritten, or
    /// `None` for a brand-new key. For every lookup the old bucket is
    /// evicted before the new bucket is added.
    pub fn apply(&mut self, key: &K, old: Option<&T>, new: &T) {
        for (name, lookup) in self.lookups.iter_mut() {
            if let Some(old) = old {
                if let Some(value) = derive(name, &lookup.extractor, key, old) {
                    lookup.index.remove(&value, key);
                }
            }
            if let Some(value) = derive(name, &lookup.extractor, key, new) {
                lookup.index.insert(value, key.clone());
            }
        }
    }

    /// Remove one key from every lookup, using the record being deleted to
    /// locate its buckets.
    pub fn evict(&mut self, key: &K, old: &T) {
        for (name, lookup) in self.lookups.iter_mut() {
            if let Some(value) = derive(name, &lookup.extractor, key, old) {
                lookup.index.remove(&value, key);
            }
        }
    }

    /// Empty every lookup's buckets, keeping the registrations.
    pub fn clear_entries(&mut self) {
        for lookup in self.lookups.values_mut() {
            lookup.index.clear();
        }
    }
}

fn derive<T, K: RecordKey>(
    name: &str,
    extractor: &LookupFn<T>,
    key: &K,
    record: &T,
) -> Option<LookupKey> {
    match extractor(record) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                target: "concord::lookup",
                lookup = name,
                key = ?key,
                error = %e,
                "Failed to derive lookup value, skipping record"
            );
            None
        }
    }
}
