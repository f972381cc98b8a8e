//! Lazy search index state
//!
//! Holds the optional backend and the currently built index. The owner
//! calls `invalidate` after every mutation of the store; the next query
//! rebuilds the index fully from the current records.
//!
//! # Failure policy
//!
//! - No backend configured: `Error::SearchUnavailable`
//! - Build failure: propagated
//! - Query failure: logged, empty result

use crate::backend::{SearchBackend, SearchDocument, SearchIndex};
use concord_core::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

/// Search collaborator state owned by one store.
pub struct SemanticSearch {
    backend: Option<Arc<dyn SearchBackend>>,
    index: Option<Box<dyn SearchIndex>>,
}

impl SemanticSearch {
    /// Create the state; no index is built yet
    pub fn new(backend: Option<Arc<dyn SearchBackend>>) -> Self {
        Self {
            backend,
            index: None,
        }
    }

    /// Whether a backend is configured
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Whether an index is currently built
    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Drop the built index, if any
    pub fn invalidate(&mut self) {
        if self.index.take().is_some() {
            tracing::debug!(target: "concord::search", "Search index invalidated");
        }
    }

    fn backend(&self) -> Result<&Arc<dyn SearchBackend>> {
        self.backend.as_ref().ok_or(Error::SearchUnavailable)
    }

    /// Build the index over `documents`.
    ///
    /// Skipped when an index already exists and `force` is false, or when
    /// there is nothing to index. Returns whether a build happened.
    pub fn build(&mut self, documents: &[SearchDocument], force: bool) -> Result<bool> {
        let backend = Arc::clone(self.backend()?);
        if !force && self.index.is_some() {
            tracing::debug!(target: "concord::search", "Index already built, skipping rebuild");
            return Ok(false);
        }
        self.index = None;
        if documents.is_empty() {
            tracing::debug!(target: "concord::search", "No records to index");
            return Ok(false);
        }

        tracing::info!(
            target: "concord::search",
            backend = backend.name(),
            documents = documents.len(),
            "Building search index"
        );
        let index = backend.build_index(documents)?;
        self.index = Some(index);
        Ok(true)
    }

    /// Build the index if none exists, rendering documents only when needed.
    pub fn ensure_built<F>(&mut self, documents: F) -> Result<()>
    where
        F: FnOnce() -> Vec<SearchDocument>,
    {
        self.backend()?;
        if self.index.is_none() {
            tracing::debug!(target: "concord::search", "Index is not built, rebuilding before search");
            let documents = documents();
            self.build(&documents, false)?;
        }
        Ok(())
    }

    /// Keys of the `k` closest records.
    ///
    /// Empty when no index is built (nothing to search) or when the query
    /// itself fails.
    pub fn query(&self, query: &str, k: usize) -> Result<Vec<Value>> {
        self.backend()?;
        let Some(index) = self.index.as_ref() else {
            tracing::debug!(target: "concord::search", "Index is empty, returning no results");
            return Ok(Vec::new());
        };
        match index.similarity_search(query, k) {
            Ok(keys) => Ok(keys),
            Err(e) => {
                tracing::error!(target: "concord::search", query, error = %e, "Search failed");
                Ok(Vec::new())
            }
        }
    }

    /// Serialized form of the built index, if any
    pub fn to_bytes(&self) -> Result<Option<Vec<u8>>> {
        match self.index.as_ref() {
            Some(index) => index.to_bytes().map(Some),
            None => Ok(None),
        }
    }

    /// Decode a persisted index without installing it
    pub fn decode(&self, bytes: &[u8]) -> Result<Box<dyn SearchIndex>> {
        self.backend()?.load_index(bytes)
    }

    /// Make `index` the current index
    pub fn install(&mut self, index: Box<dyn SearchIndex>) {
        tracing::info!(
            target: "concord::search",
            documents = index.len(),
            "Search index restored"
        );
        self.index = Some(index);
    }

    /// Replace the index with one restored from bytes
    pub fn restore(&mut self, bytes: &[u8]) -> Result<()> {
        let index = self.decode(bytes)?;
        self.install(index);
        Ok(())
    }
}
