//! Rendering records into search documents
//!
//! With `fields_for_index` configured, a record becomes one `field: value`
//! line per listed field that is present and non-null. Without it, the
//! record's full JSON with nulls removed is used. String values are written
//! bare, everything else as compact JSON.

use crate::backend::SearchDocument;
use concord_core::RecordKey;
use serde::Serialize;
use serde_json::Value;

/// Text used to embed/score a record given its JSON form.
pub fn document_text(record: &Value, fields_for_index: &[String]) -> String {
    if fields_for_index.is_empty() {
        return strip_nulls(record).to_string();
    }

    let mut lines = Vec::with_capacity(fields_for_index.len());
    for field in fields_for_index {
        match record.get(field) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => lines.push(format!("{}: {}", field, s)),
            Some(other) => lines.push(format!("{}: {}", field, other)),
        }
    }
    lines.join("\n")
}

/// Render one `(key, record)` pair.
///
/// Returns `None` when either side cannot be serialized; the record is then
/// left out of the index.
pub fn build_document<K, T>(key: &K, record: &T, fields_for_index: &[String]) -> Option<SearchDocument>
where
    K: RecordKey,
    T: Serialize,
{
    let raw = match serde_json::to_value(record) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(target: "concord::search", key = ?key, error = %e, "Failed to serialize record for indexing");
            return None;
        }
    };
    let key_json = match serde_json::to_value(key) {
        Ok(k) => k,
        Err(e) => {
            tracing::warn!(target: "concord::search", key = ?key, error = %e, "Failed to serialize key for indexing");
            return None;
        }
    };
    Some(SearchDocument {
        text: document_text(&raw, fields_for_index),
        key: key_json,
        raw,
    })
}

fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}
