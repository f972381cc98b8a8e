//! Field-level merge over the record's JSON object form
//!
//! ## Rules
//!
//! 1. Start from the existing record's fields.
//! 2. Every field the incoming record *sets* overwrites the existing value.
//! 3. A field is unset when it is `null`, an empty array or an empty object.
//!    `false`, `0` and `""` are set values.
//! 4. A non-empty list on incoming replaces the existing list as a whole.
//!    Lists are never concatenated.
//!
//! Fields missing from incoming (e.g. skipped by `skip_serializing_if`)
//! keep the existing value.

use crate::error::MergeError;
use crate::merger::Merger;
use concord_core::{to_object, Record};
use serde_json::Value;

/// Field-level merge: incoming fills gaps and overrides what it sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMerge;

impl FieldMerge {
    /// Whether an incoming field value leaves the existing one untouched.
    pub fn is_unset(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }
}

impl<T: Record> Merger<T> for FieldMerge {
    fn name(&self) -> &str {
        "field_merge"
    }

    fn pair_merge(&self, existing: &T, incoming: &T) -> Result<T, MergeError> {
        let mut merged = to_object(existing)
            .ok_or_else(|| MergeError::Schema("existing record is not an object".into()))?;
        let overlay = to_object(incoming)
            .ok_or_else(|| MergeError::Schema("incoming record is not an object".into()))?;

        for (field, value) in overlay {
            if !Self::is_unset(&value) {
                merged.insert(field, value);
            }
        }

        serde_json::from_value(Value::Object(merged)).map_err(|e| MergeError::Schema(e.to_string()))
    }
}
