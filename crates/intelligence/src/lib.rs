//! Intelligence layer for Concord
//!
//! Merge policies that delegate conflict resolution to a remote reasoning
//! model, consumed through a narrow synchronous batch-call interface.
//!
//! This crate provides:
//! - RemoteMergeBackend trait: one round-trip merges a whole batch of pairs
//! - ApiMergeBackend: OpenAI-compatible chat completions backend (`remote` feature)
//! - Instruction: balanced / prefer-existing / prefer-incoming / custom-rule prompts
//! - LlmMerger: `Merger` implementation with timeout, single retry and fail-closed fallback
//!
//! # Usage
//!
//! ```ignore
//! use concord_intelligence::{ApiMergeBackend, LlmMerger};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(ApiMergeBackend::new("http://localhost:11434/v1", "qwen3:1.7b", None, 30_000));
//! let merger: LlmMerger<Person> = LlmMerger::balanced(backend);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod llm_client;
pub mod remote;

pub use llm_client::LlmClientError;
pub use remote::{
    ApiMergeBackend, DynamicRule, Instruction, LlmMerger, RemoteMergeBackend,
    DEFAULT_MERGE_TIMEOUT,
};
