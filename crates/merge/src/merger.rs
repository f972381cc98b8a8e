//! Merger trait
//!
//! A merger decides, for two fragments sharing a key, which information
//! survives. Mergers own no canonical state; one merger is bound to one
//! store.
//!
//! # Fail-closed contract
//!
//! Policies report failures as `Err(MergeError)`. The `MergeEngine` turns
//! every failed pair into its incoming fragment ("last write wins" for that
//! pair) and logs the failure. A policy must never panic to signal failure.

use crate::error::MergeError;
use concord_core::Record;

/// Pluggable merge policy.
///
/// The trait is object-safe for use as `Arc<dyn Merger<T>>`.
///
/// # Implementations
///
/// - `KeepExisting`, `KeepIncoming`, `FieldMerge` (this crate)
/// - `LlmMerger` (`concord-intelligence`), which overrides `batch_merge`
///   to issue one remote call per batch
pub trait Merger<T: Record>: Send + Sync {
    /// Human-readable policy name
    fn name(&self) -> &str;

    /// Merge one pair. Must be deterministic given the policy configuration.
    fn pair_merge(&self, existing: &T, incoming: &T) -> Result<T, MergeError>;

    /// Merge many independent pairs.
    ///
    /// Results are returned in input order, one per pair. The default calls
    /// `pair_merge` sequentially; policies with an expensive merge step
    /// override this to issue a single batched call.
    fn batch_merge(&self, pairs: &[(T, T)]) -> Vec<Result<T, MergeError>> {
        pairs
            .iter()
            .map(|(existing, incoming)| self.pair_merge(existing, incoming))
            .collect()
    }

    /// Called for records stored through the insert fast path, which never
    /// reaches `pair_merge`. Default: no-op.
    fn on_insert(&self, _record: &T) {}
}
