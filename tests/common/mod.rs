//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use concord::{
    Error, FieldMerge, KeepExisting, KeepIncoming, KeywordBackend, LlmClientError, Memory,
    MergeStrategy, Merger, RemoteMergeBackend,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Record schema
// ============================================================================

/// Character sheet used across suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    pub name: Option<String>,
    pub value: Option<i64>,
    pub loc: Option<String>,
    pub tags: Vec<String>,
}

impl Character {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            value: None,
            loc: None,
            tags: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn loc(mut self, loc: &str) -> Self {
        self.loc = Some(loc.to_string());
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

pub fn character_key(c: &Character) -> Option<u32> {
    Some(c.id)
}

/// Memory over `Character` with the given policy, no search.
pub fn memory_with(merger: Arc<dyn Merger<Character>>) -> Memory<Character, u32> {
    Memory::new(character_key, merger)
}

/// Memory with `field_merge` and keyword search over name and loc.
pub fn searchable_memory() -> Memory<Character, u32> {
    Memory::builder(character_key)
        .search_backend(Arc::new(KeywordBackend::default()))
        .fields_for_index(["name", "loc"])
        .build()
        .expect("searchable memory")
}

// ============================================================================
// Remote backend stand-in
// ============================================================================

/// Remote backend that overlays non-null incoming fields, counting calls.
#[derive(Default)]
pub struct OverlayBackend {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl OverlayBackend {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteMergeBackend for OverlayBackend {
    fn batch_merge_remote(
        &self,
        pairs: &[(Value, Value)],
        _instruction: &str,
    ) -> Result<Vec<Value>, LlmClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LlmClientError::Network("connection refused".into()));
        }
        Ok(pairs
            .iter()
            .map(|(existing, incoming)| {
                let mut merged = existing.clone();
                if let (Some(target), Some(source)) = (merged.as_object_mut(), incoming.as_object()) {
                    for (field, value) in source {
                        if !value.is_null() {
                            target.insert(field.clone(), value.clone());
                        }
                    }
                }
                merged
            })
            .collect())
    }
}
