//! Memory: the consolidating store facade
//!
//! Orchestrates the canonical store, the lookups, the merge engine and the
//! search/persistence collaborators.
//!
//! # Add path
//!
//! ```text
//! fragments ──group by key──┬─ new key, 1 fragment ──────────────► insert (fast path)
//!                           └─ existing key or duplicates
//!                                 │ snapshot old record
//!                                 │ prepend old record
//!                                 ▼
//!                           MergeEngine (one batch call per round)
//!                                 │
//!                                 ▼
//!                           lookups: evict(old) then add(new); store: overwrite
//! ```
//!
//! # Concurrency
//!
//! One `RwLock` guards store, lookups and search state together. Mutations
//! hold the write lock for their whole snapshot, merge, store, re-index
//! sequence, remote merge calls included. Projections take the read lock.

use crate::builder::MemoryBuilder;
use concord_core::{
    schema_name, to_object, Error, KeyFn, LookupError, LookupKey, Record, RecordKey, Result,
};
use concord_durability::{read_index, read_metadata, read_records, write_snapshot, SnapshotMetadata};
use concord_merge::{group_by_key, MergeEngine, Merger, ReduceReport};
use concord_search::{build_document, SearchBackend, SearchDocument, SemanticSearch};
use concord_storage::{CanonicalStore, LookupFn, LookupRegistry};
use parking_lot::RwLock;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Outcome of one `add` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Brand-new keys stored without merging
    pub inserted: usize,
    /// Keys whose record went through the merge engine
    pub merged: usize,
    /// Fragments dropped because their key could not be extracted
    pub dropped: usize,
    /// Merge engine counters
    pub reduce: ReduceReport,
}

struct MemoryState<T: Record, K: RecordKey> {
    store: CanonicalStore<K, T>,
    lookups: LookupRegistry<T, K>,
    search: SemanticSearch,
}

/// Consolidating associative store of `T` records keyed by `K`.
pub struct Memory<T: Record, K: RecordKey> {
    key_of: KeyFn<T, K>,
    engine: MergeEngine<T>,
    fields_for_index: Vec<String>,
    state: RwLock<MemoryState<T, K>>,
}

impl<T: Record, K: RecordKey> Memory<T, K> {
    /// Create a memory with the given key function and merger, no search.
    pub fn new<F>(key_of: F, merger: Arc<dyn Merger<T>>) -> Self
    where
        F: Fn(&T) -> Option<K> + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(key_of), merger, None, Vec::new())
    }

    /// Start configuring a memory.
    pub fn builder<F>(key_of: F) -> MemoryBuilder<T, K>
    where
        F: Fn(&T) -> Option<K> + Send + Sync + 'static,
    {
        MemoryBuilder::new(key_of)
    }

    pub(crate) fn from_parts(
        key_of: KeyFn<T, K>,
        merger: Arc<dyn Merger<T>>,
        search_backend: Option<Arc<dyn SearchBackend>>,
        fields_for_index: Vec<String>,
    ) -> Self {
        tracing::debug!(
            target: "concord::memory",
            schema = schema_name::<T>(),
            merger = merger.name(),
            search = search_backend.is_some(),
            "Memory created"
        );
        Self {
            key_of,
            engine: MergeEngine::new(merger),
            fields_for_index,
            state: RwLock::new(MemoryState {
                store: CanonicalStore::new(),
                lookups: LookupRegistry::new(),
                search: SemanticSearch::new(search_backend),
            }),
        }
    }

    // ========================================================================
    // Write path
    // ========================================================================

    /// Add fragments, consolidating them with what is already stored.
    ///
    /// Never fails: unkeyed fragments are dropped and merge failures fall
    /// back to the incoming fragment, both logged.
    pub fn add<I>(&self, records: I) -> AddReport
    where
        I: IntoIterator<Item = T>,
    {
        let mut state = self.state.write();
        self.add_locked(&mut state, records)
    }

    /// Add a single fragment.
    pub fn add_one(&self, record: T) -> AddReport {
        self.add(std::iter::once(record))
    }

    /// Add fragments given as JSON.
    ///
    /// Every value is converted first; if any fails to match the record
    /// schema the call is aborted with `Error::SchemaViolation` and nothing
    /// is stored.
    pub fn add_json<I>(&self, values: I) -> Result<AddReport>
    where
        I: IntoIterator<Item = Value>,
    {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<T>(value).map_err(|e| Error::SchemaViolation {
                    index,
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<T>>>()?;
        Ok(self.add(records))
    }

    fn add_locked<I>(&self, state: &mut MemoryState<T, K>, records: I) -> AddReport
    where
        I: IntoIterator<Item = T>,
    {
        let (groups, dropped) = group_by_key(records, &*self.key_of);
        let mut report = AddReport {
            dropped,
            ..AddReport::default()
        };

        let mut pending: Vec<(K, Vec<T>)> = Vec::new();
        let mut snapshots: Vec<Option<T>> = Vec::new();

        for (key, mut fragments) in groups {
            // Snapshot before anything can overwrite the store
            let old = state.store.get(&key).cloned();

            if old.is_none() && fragments.len() == 1 {
                if let Some(record) = fragments.pop() {
                    self.engine.merger().on_insert(&record);
                    state.lookups.apply(&key, None, &record);
                    state.store.insert(key, record);
                    report.inserted += 1;
                }
                continue;
            }

            if let Some(existing) = &old {
                fragments.insert(0, existing.clone());
            }
            pending.push((key, fragments));
            snapshots.push(old);
        }

        if !pending.is_empty() {
            let (merged, reduce) = self.engine.reduce(pending);
            report.reduce = reduce;
            for ((key, record), old) in merged.into_iter().zip(snapshots) {
                state.lookups.apply(&key, old.as_ref(), &record);
                state.store.insert(key, record);
                report.merged += 1;
            }
        }

        if report.inserted + report.merged > 0 {
            state.search.invalidate();
        }

        tracing::debug!(
            target: "concord::memory",
            inserted = report.inserted,
            merged = report.merged,
            dropped = report.dropped,
            batch_calls = report.reduce.batch_calls,
            size = state.store.len(),
            "Add complete"
        );
        report
    }

    /// Remove a key. Returns false if it was not stored.
    ///
    /// Lookup entries are purged using the record being deleted before the
    /// canonical entry goes away.
    pub fn remove(&self, key: &K) -> bool {
        let mut guard = self.state.write();
        let MemoryState {
            store,
            lookups,
            search,
        } = &mut *guard;

        let Some(old) = store.get(key) else {
            return false;
        };
        lookups.evict(key, old);
        store.remove(key);
        search.invalidate();
        tracing::debug!(target: "concord::memory", key = ?key, "Record removed");
        true
    }

    /// Remove every record and lookup entry, keeping lookup registrations.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let removed = state.store.len();
        state.store.clear();
        state.lookups.clear_entries();
        state.search.invalidate();
        tracing::info!(target: "concord::memory", removed, "Memory cleared");
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// Canonical record for a key
    pub fn get(&self, key: &K) -> Option<T> {
        self.state.read().store.get(key).cloned()
    }

    /// Whether a key is stored
    pub fn contains(&self, key: &K) -> bool {
        self.state.read().store.contains(key)
    }

    /// All keys, in first-insertion order
    pub fn keys(&self) -> Vec<K> {
        self.state.read().store.keys().cloned().collect()
    }

    /// All canonical records, in key first-insertion order
    pub fn items(&self) -> Vec<T> {
        self.state.read().store.values().cloned().collect()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.state.read().store.len()
    }

    /// Number of stored keys
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.state.read().store.is_empty()
    }

    /// Name of the active merge policy
    pub fn merger_name(&self) -> String {
        self.engine.merger().name().to_string()
    }

    /// Fields rendered into search documents
    pub fn fields_for_index(&self) -> &[String] {
        &self.fields_for_index
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Register a lookup over a derived value and back-fill it.
    ///
    /// Records for which `extract` returns `None` are not indexed. Returns
    /// the number of records indexed.
    pub fn create_lookup<V, F>(&self, name: &str, extract: F) -> Result<usize>
    where
        V: Into<LookupKey>,
        F: Fn(&T) -> Option<V> + Send + Sync + 'static,
    {
        self.register_lookup(
            name,
            Arc::new(
                move |record: &T| -> std::result::Result<Option<LookupKey>, LookupError> {
                    Ok(extract(record).map(Into::into))
                },
            ),
        )
    }

    /// Register a lookup whose extractor may fail.
    ///
    /// A failing record is skipped for this lookup only, with a warning.
    pub fn create_lookup_with<F>(&self, name: &str, extract: F) -> Result<usize>
    where
        F: Fn(&T) -> std::result::Result<Option<LookupKey>, LookupError> + Send + Sync + 'static,
    {
        self.register_lookup(name, Arc::new(extract))
    }

    /// Register a lookup on a top-level field of the record's JSON form.
    ///
    /// Null or missing values are not indexed; floats, arrays and objects
    /// are skipped as non-hashable.
    pub fn create_field_lookup(&self, name: &str, field: &str) -> Result<usize> {
        let field = field.to_string();
        self.register_lookup(
            name,
            Arc::new(move |record: &T| -> std::result::Result<Option<LookupKey>, LookupError> {
                let object = to_object(record).ok_or_else(|| {
                    LookupError::Extraction("record is not a JSON object".to_string())
                })?;
                match object.get(&field) {
                    Some(value) => LookupKey::from_json(value),
                    None => Ok(None),
                }
            }),
        )
    }

    fn register_lookup(&self, name: &str, extractor: LookupFn<T>) -> Result<usize> {
        let mut guard = self.state.write();
        let MemoryState { store, lookups, .. } = &mut *guard;
        lookups.create(name, extractor, store.iter())
    }

    /// Records whose derived value under `name` equals `value`.
    ///
    /// Empty for an unknown lookup or value.
    pub fn get_by_lookup(&self, name: &str, value: impl Into<LookupKey>) -> Vec<T> {
        let value = value.into();
        let state = self.state.read();
        state
            .lookups
            .keys_for(name, &value)
            .iter()
            .filter_map(|key| {
                let record = state.store.get(key);
                if record.is_none() {
                    tracing::warn!(
                        target: "concord::memory",
                        lookup = name,
                        key = ?key,
                        "Lookup references a missing key, skipping"
                    );
                }
                record.cloned()
            })
            .collect()
    }

    /// Remove a lookup. Returns false if it did not exist.
    pub fn drop_lookup(&self, name: &str) -> bool {
        self.state.write().lookups.drop_lookup(name)
    }

    /// Registered lookup names, in creation order
    pub fn list_lookups(&self) -> Vec<String> {
        self.state.read().lookups.names()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Whether a search index is currently built
    pub fn has_index(&self) -> bool {
        self.state.read().search.has_index()
    }

    /// Build the search index now.
    ///
    /// Skipped if an index is already built, unless `force`.
    ///
    /// # Errors
    ///
    /// `Error::SearchUnavailable` without a search backend; backend build
    /// failures are propagated.
    pub fn build_index(&self, force: bool) -> Result<()> {
        let mut guard = self.state.write();
        let MemoryState { store, search, .. } = &mut *guard;
        let documents = render_documents(store, &self.fields_for_index);
        search.build(&documents, force)?;
        Ok(())
    }

    /// Drop the search index without touching stored records
    pub fn clear_index(&self) {
        self.state.write().search.invalidate();
    }

    /// Up to `k` records most similar to `query`, closest first.
    ///
    /// Rebuilds the index first if the store changed since the last build.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<T>> {
        {
            let state = self.state.read();
            if state.search.has_index() {
                return self.search_built(&state, query, k);
            }
        }

        let mut guard = self.state.write();
        {
            let MemoryState { store, search, .. } = &mut *guard;
            search.ensure_built(|| render_documents(store, &self.fields_for_index))?;
        }
        self.search_built(&guard, query, k)
    }

    fn search_built(&self, state: &MemoryState<T, K>, query: &str, k: usize) -> Result<Vec<T>> {
        let keys = state.search.query(query, k)?;
        let results: Vec<T> = keys
            .into_iter()
            .filter_map(|key_json| match serde_json::from_value::<K>(key_json) {
                Ok(key) => state.store.get(&key).cloned(),
                Err(e) => {
                    tracing::warn!(target: "concord::search", error = %e, "Failed to restore key from search result");
                    None
                }
            })
            .collect();
        tracing::debug!(target: "concord::search", query, results = results.len(), "Search complete");
        Ok(results)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write a snapshot of the store into `dir`.
    ///
    /// # Errors
    ///
    /// Any I/O or serialization failure.
    pub fn dump(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        let state = self.state.read();
        let records: Vec<&T> = state.store.values().collect();
        let metadata = SnapshotMetadata::new(schema_name::<T>(), records.len())
            .with_fields_for_index(self.fields_for_index.clone())
            .with_lookups(state.lookups.names());
        let index = state.search.to_bytes()?;
        write_snapshot(dir, &records, &metadata, index.as_deref())
    }

    /// Load a snapshot from `dir`, merging its records into this store.
    ///
    /// Returns the number of records read. The persisted search index is
    /// restored only when a search backend is configured and the store was
    /// empty before loading; otherwise it would not match the merged data.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` without `memory.json`, `Error::Serialization` for
    /// malformed records (or records of another schema), `Error::Corruption`
    /// for a damaged index blob.
    pub fn load(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let records: Vec<T> = read_records(dir)?;
        let count = records.len();

        match read_metadata(dir) {
            Ok(Some(meta)) if meta.schema_name != schema_name::<T>() => {
                tracing::warn!(
                    target: "concord::durability",
                    stored = %meta.schema_name,
                    expected = schema_name::<T>(),
                    "Snapshot schema name differs"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(target: "concord::durability", error = %e, "Ignoring unreadable snapshot metadata");
            }
        }

        let mut state = self.state.write();
        // The index is decoded before any record is stored so a damaged
        // blob leaves the store untouched.
        let restored = if !state.search.has_backend() {
            None
        } else if !state.store.is_empty() {
            tracing::debug!(target: "concord::durability", "Store was not empty, persisted index not restored");
            None
        } else {
            match read_index(dir)? {
                Some(bytes) => Some(state.search.decode(&bytes)?),
                None => None,
            }
        };

        self.add_locked(&mut state, records);
        if let Some(index) = restored {
            state.search.install(index);
        }

        tracing::info!(
            target: "concord::durability",
            dir = %dir.display(),
            records = count,
            size = state.store.len(),
            "Snapshot loaded"
        );
        Ok(count)
    }
}

fn render_documents<T: Record, K: RecordKey>(
    store: &CanonicalStore<K, T>,
    fields_for_index: &[String],
) -> Vec<SearchDocument> {
    store
        .iter()
        .filter_map(|(key, record)| build_document(key, record, fields_for_index))
        .collect()
}
