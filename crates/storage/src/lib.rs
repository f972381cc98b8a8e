//! Storage layer for Concord
//!
//! This crate implements the in-memory state behind a memory store:
//! - CanonicalStore: key -> record map, the single source of truth
//! - LookupIndex: one secondary index, derived value -> set of keys
//! - LookupRegistry: named lookups kept in sync with the store
//!
//! Neither type locks internally; the engine's façade serializes access.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod store;

pub use index::{LookupFn, LookupIndex, LookupRegistry};
pub use store::CanonicalStore;
