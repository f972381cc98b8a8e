//! Search collaborator interface
//!
//! Defines the interface for swappable similarity-search implementations
//! (an embedding service plus nearest-neighbor index, or the built-in
//! keyword backend).
//!
//! IMPORTANT: indices are always rebuilt from scratch. Do NOT add methods
//! that assume incremental insert/delete; the store drops the index on
//! every mutation and rebuilds it lazily.

use concord_core::Result;
use serde_json::Value;

/// One record rendered for indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDocument {
    /// Text handed to the embedder / scorer
    pub text: String,
    /// The record's key in JSON form
    pub key: Value,
    /// The full record in JSON form
    pub raw: Value,
}

/// Builds and restores search indices.
///
/// The trait is object-safe for use as `Arc<dyn SearchBackend>`.
pub trait SearchBackend: Send + Sync {
    /// Build a fresh index over the documents
    fn build_index(&self, documents: &[SearchDocument]) -> Result<Box<dyn SearchIndex>>;

    /// Restore an index from the bytes produced by `SearchIndex::to_bytes`
    fn load_index(&self, bytes: &[u8]) -> Result<Box<dyn SearchIndex>>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// A built index.
pub trait SearchIndex: Send + Sync {
    /// Keys of the `k` most similar documents, closest first.
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Value>>;

    /// Opaque serialized form, restorable with `SearchBackend::load_index`
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Number of documents indexed
    fn len(&self) -> usize;

    /// Check if nothing is indexed
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
