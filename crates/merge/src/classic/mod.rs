//! Deterministic built-in merge policies

mod field_merge;

pub use field_merge::FieldMerge;

use crate::error::MergeError;
use crate::merger::Merger;
use concord_core::Record;

/// Keeps the existing fragment and discards the incoming one.
///
/// Preserves the first occurrence of every key.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepExisting;

impl<T: Record> Merger<T> for KeepExisting {
    fn name(&self) -> &str {
        "keep_existing"
    }

    fn pair_merge(&self, existing: &T, _incoming: &T) -> Result<T, MergeError> {
        Ok(existing.clone())
    }
}

/// Keeps the incoming fragment and discards the existing one.
///
/// The most recent submission for a key wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepIncoming;

impl<T: Record> Merger<T> for KeepIncoming {
    fn name(&self) -> &str {
        "keep_incoming"
    }

    fn pair_merge(&self, _existing: &T, incoming: &T) -> Result<T, MergeError> {
        Ok(incoming.clone())
    }
}
