//! Search collaborator for Concord
//!
//! This crate provides:
//! - SearchBackend / SearchIndex traits for pluggable similarity search
//! - SearchDocument and the record-to-text rendering used for indexing
//! - KeywordBackend: BM25-lite default implementation
//! - Basic tokenizer
//! - SemanticSearch: lazily rebuilt index state owned by a store
//!
//! # Usage
//!
//! ```ignore
//! use concord_search::{KeywordBackend, SemanticSearch};
//! use std::sync::Arc;
//!
//! let mut search = SemanticSearch::new(Some(Arc::new(KeywordBackend::default())));
//! search.ensure_built(|| documents)?;
//! let keys = search.query("ring bearer", 5)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod document;
pub mod keyword;
pub mod semantic;
pub mod tokenizer;

pub use backend::{SearchBackend, SearchDocument, SearchIndex};
pub use document::{build_document, document_text};
pub use keyword::{KeywordBackend, KeywordIndex};
pub use semantic::SemanticSearch;
pub use tokenizer::{tokenize, tokenize_unique};
