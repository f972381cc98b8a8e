//! Remote reasoning merge policies
//!
//! This module provides the `RemoteMergeBackend` trait, the collaborator
//! that merges many `(existing, incoming)` pairs in ONE synchronous call,
//! and `LlmMerger`, the merge policy built on top of it.
//!
//! # Policies
//!
//! | Instruction | On semantic conflict |
//! |-------------|----------------------|
//! | `Balanced` | No preference, the model picks the better value |
//! | `PreferExisting` | Existing value wins |
//! | `PreferIncoming` | Incoming value wins |
//! | `Custom` | Caller-supplied rule, plus optional per-call context |
//!
//! Records travel as their serde JSON form; the merged objects coming back
//! are deserialized into the record type one by one.

pub mod api;
pub mod merger;
pub mod parser;
pub mod prompt;

#[cfg(test)]
pub(crate) mod mock;

pub use api::ApiMergeBackend;
pub use merger::{LlmMerger, DEFAULT_MERGE_TIMEOUT};
pub use prompt::{DynamicRule, Instruction};

use crate::llm_client::LlmClientError;
use serde_json::Value;

/// Collaborator that merges a batch of record pairs remotely.
///
/// Implementations receive the pairs as JSON and return exactly one merged
/// JSON object per pair, in input order. The trait is object-safe for use
/// as `Arc<dyn RemoteMergeBackend>`.
///
/// # Implementations
///
/// - `ApiMergeBackend`: calls an OpenAI-compatible endpoint
pub trait RemoteMergeBackend: Send + Sync {
    /// Merge every pair with one round-trip.
    fn batch_merge_remote(
        &self,
        pairs: &[(Value, Value)],
        instruction: &str,
    ) -> Result<Vec<Value>, LlmClientError>;
}
