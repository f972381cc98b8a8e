//! Built-in keyword search backend
//!
//! A BM25-lite scorer over the rendered document text. Needs no external
//! embedding service, which makes it the default for local use and tests;
//! swap in an embedding backend for semantic similarity.
//!
//! # BM25 Formula
//!
//! For each query term t:
//! score += IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl/avgdl))
//!
//! Where:
//! - tf = term frequency in document
//! - dl = document length
//! - avgdl = average document length
//! - k1 = term saturation parameter (default 1.2)
//! - b = length normalization parameter (default 0.75)

use crate::backend::{SearchBackend, SearchDocument, SearchIndex};
use crate::tokenizer::{tokenize, tokenize_unique};
use concord_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Keyword backend with BM25-lite scoring
#[derive(Debug, Clone)]
pub struct KeywordBackend {
    k1: f32,
    b: f32,
}

impl Default for KeywordBackend {
    fn default() -> Self {
        KeywordBackend { k1: 1.2, b: 0.75 }
    }
}

impl KeywordBackend {
    /// Create a backend with custom BM25 parameters
    pub fn new(k1: f32, b: f32) -> Self {
        KeywordBackend { k1, b }
    }
}

impl SearchBackend for KeywordBackend {
    fn build_index(&self, documents: &[SearchDocument]) -> Result<Box<dyn SearchIndex>> {
        Ok(Box::new(KeywordIndex::build(documents, self.k1, self.b)))
    }

    fn load_index(&self, bytes: &[u8]) -> Result<Box<dyn SearchIndex>> {
        let index: KeywordIndex = serde_json::from_slice(bytes)
            .map_err(|e| Error::Corruption(format!("invalid keyword index: {}", e)))?;
        Ok(Box::new(index))
    }

    fn name(&self) -> &str {
        "keyword-bm25"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedDoc {
    key: Value,
    term_counts: HashMap<String, u32>,
    len: u32,
}

/// Index produced by `KeywordBackend`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordIndex {
    docs: Vec<IndexedDoc>,
    doc_freqs: HashMap<String, usize>,
    avg_doc_len: f32,
    k1: f32,
    b: f32,
}

impl KeywordIndex {
    fn build(documents: &[SearchDocument], k1: f32, b: f32) -> Self {
        let mut docs = Vec::with_capacity(documents.len());
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for document in documents {
            let terms = tokenize(&document.text);
            total_len += terms.len();
            let mut term_counts: HashMap<String, u32> = HashMap::new();
            for term in terms.iter() {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
            }
            for term in term_counts.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            docs.push(IndexedDoc {
                key: document.key.clone(),
                term_counts,
                len: terms.len() as u32,
            });
        }

        let avg_doc_len = if docs.is_empty() {
            0.0
        } else {
            total_len as f32 / docs.len() as f32
        };

        KeywordIndex {
            docs,
            doc_freqs,
            avg_doc_len,
            k1,
            b,
        }
    }

    /// Standard IDF with smoothing: ln((N - df + 0.5) / (df + 0.5) + 1)
    fn idf(&self, term: &str) -> f32 {
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f32;
        let n = self.docs.len() as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, doc: &IndexedDoc, query_terms: &[String]) -> f32 {
        let avg_len = self.avg_doc_len.max(1.0);
        let doc_len = doc.len as f32;
        let mut score = 0.0;
        for term in query_terms {
            let tf = doc.term_counts.get(term).copied().unwrap_or(0) as f32;
            if tf == 0.0 {
                continue;
            }
            let tf_component =
                (tf * (self.k1 + 1.0)) / (tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_len));
            score += self.idf(term) * tf_component;
        }
        score
    }
}

impl SearchIndex for KeywordIndex {
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Value>> {
        let query_terms = tokenize_unique(query);
        if k == 0 || query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .docs
            .iter()
            .enumerate()
            .map(|(pos, doc)| (pos, self.score(doc, &query_terms)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // Score desc, then document order for ties
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(pos, _)| self.docs[pos].key.clone())
            .collect())
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(Error::from)
    }

    fn len(&self) -> usize {
        self.docs.len()
    }
}
