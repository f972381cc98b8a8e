//! Integration Tests
//!
//! Cross-crate tests through the public `concord` API, organized by concern:
//! - Scenarios: documented add/lookup/remove behaviors
//! - Properties: size law, lookup invariant, idempotence, batch-call count
//! - Persistence: dump/load round trips
//! - Search: lazy index over the canonical store
//! - Remote merge: LLM strategies through the builder and config

#[path = "../common/mod.rs"]
mod common;

mod persistence;
mod properties;
mod remote_merge;
mod scenarios;
mod search;
