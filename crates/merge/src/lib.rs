//! Merge layer for Concord
//!
//! This crate provides:
//! - Merger trait: pluggable pairwise + batched merge policy
//! - MergeError: policy failures, absorbed by the engine
//! - KeepExisting / KeepIncoming / FieldMerge built-in policies
//! - MergeEngine: cross-key tournament reduction issuing one batch call per round
//! - MergeStrategy: named policies for configuration
//!
//! # Usage
//!
//! ```ignore
//! use concord_merge::{FieldMerge, MergeEngine};
//! use std::sync::Arc;
//!
//! let engine = MergeEngine::new(Arc::new(FieldMerge));
//! let (merged, report) = engine.merge(fragments, &|r: &Person| Some(r.id));
//! assert_eq!(report.batch_calls, report.rounds);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod classic;
pub mod engine;
pub mod error;
pub mod merger;
pub mod strategy;

pub use classic::{FieldMerge, KeepExisting, KeepIncoming};
pub use engine::{group_by_key, rounds_for, MergeEngine, ReduceReport};
pub use error::MergeError;
pub use merger::Merger;
pub use strategy::MergeStrategy;
