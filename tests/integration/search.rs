//! Search over the canonical store

use crate::common::*;
use concord::{SearchBackend, SearchDocument, SearchIndex};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Wraps the keyword backend and counts full builds.
#[derive(Default)]
struct CountingBackend {
    builds: AtomicUsize,
    last_corpus: parking_lot::Mutex<Vec<String>>,
    inner: KeywordBackend,
}

impl SearchBackend for CountingBackend {
    fn build_index(&self, documents: &[SearchDocument]) -> concord::Result<Box<dyn SearchIndex>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        *self.last_corpus.lock() = documents.iter().map(|d| d.text.clone()).collect();
        self.inner.build_index(documents)
    }

    fn load_index(&self, bytes: &[u8]) -> concord::Result<Box<dyn SearchIndex>> {
        self.inner.load_index(bytes)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Returns keys that no longer exist in the store.
struct StaleIndex;

impl SearchIndex for StaleIndex {
    fn similarity_search(&self, _query: &str, _k: usize) -> concord::Result<Vec<Value>> {
        Ok(vec![Value::from(404), Value::from(1)])
    }

    fn to_bytes(&self) -> concord::Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn len(&self) -> usize {
        1
    }
}

struct StaleBackend;

impl SearchBackend for StaleBackend {
    fn build_index(&self, _documents: &[SearchDocument]) -> concord::Result<Box<dyn SearchIndex>> {
        Ok(Box::new(StaleIndex))
    }

    fn load_index(&self, _bytes: &[u8]) -> concord::Result<Box<dyn SearchIndex>> {
        Ok(Box::new(StaleIndex))
    }

    fn name(&self) -> &str {
        "stale"
    }
}

#[test]
fn search_rebuilds_lazily_and_fully() {
    let backend = Arc::new(CountingBackend::default());
    let memory = Memory::builder(character_key)
        .search_backend(backend.clone())
        .fields_for_index(["name"])
        .build()
        .unwrap();

    memory.add(vec![Character::new(1).name("Frodo"), Character::new(2).name("Sam")]);
    assert_eq!(backend.builds.load(Ordering::SeqCst), 0);

    memory.search("frodo", 1).unwrap();
    memory.search("sam", 1).unwrap();
    assert_eq!(backend.builds.load(Ordering::SeqCst), 1);

    memory.add_one(Character::new(3).name("Merry"));
    let hits = memory.search("merry", 3).unwrap();
    assert_eq!(hits, vec![Character::new(3).name("Merry")]);
    assert_eq!(backend.builds.load(Ordering::SeqCst), 2);
    assert_eq!(backend.last_corpus.lock().len(), 3);
}

#[test]
fn forced_build_replaces_existing_index() {
    let backend = Arc::new(CountingBackend::default());
    let memory = Memory::builder(character_key)
        .search_backend(backend.clone())
        .build()
        .unwrap();
    memory.add_one(Character::new(1).name("Pippin"));

    memory.build_index(false).unwrap();
    memory.build_index(false).unwrap();
    assert_eq!(backend.builds.load(Ordering::SeqCst), 1);
    memory.build_index(true).unwrap();
    assert_eq!(backend.builds.load(Ordering::SeqCst), 2);
}

#[test]
fn removed_records_leave_search_results() {
    let memory = searchable_memory();
    memory.add(vec![Character::new(1).loc("Mordor"), Character::new(2).loc("Mordor")]);
    assert_eq!(memory.search("mordor", 5).unwrap().len(), 2);

    memory.remove(&1);
    let hits = memory.search("mordor", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 2);
}

#[test]
fn unresolvable_keys_are_skipped() {
    let memory = Memory::builder(character_key)
        .search_backend(Arc::new(StaleBackend))
        .build()
        .unwrap();
    memory.add_one(Character::new(1).name("Tom"));
    let hits = memory.search("tom", 5).unwrap();
    assert_eq!(hits, vec![Character::new(1).name("Tom")]);
}

#[test]
fn search_without_backend_is_an_error() {
    let memory = memory_with(Arc::new(FieldMerge));
    memory.add_one(Character::new(1).name("Tom"));
    assert!(matches!(memory.search("tom", 1), Err(Error::SearchUnavailable)));
}

#[test]
fn empty_store_searches_to_nothing() {
    let memory = searchable_memory();
    assert!(memory.search("anything", 10).unwrap().is_empty());
    memory.add_one(Character::new(1).name("Tom"));
    memory.clear();
    assert!(memory.search("tom", 10).unwrap().is_empty());
}
