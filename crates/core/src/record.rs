//! Record model
//!
//! Records are opaque, caller-defined structured values. The system never
//! looks at field semantics except through caller-supplied functions, or
//! through the record's serde JSON object form for field-level policies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// A structured value that can be stored and consolidated.
///
/// Implemented automatically for every type meeting the bounds.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Record for T where T: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Logical identity of a record. Several fragments may share one key.
///
/// Implemented automatically for every type meeting the bounds.
pub trait RecordKey:
    Clone + Debug + Eq + Hash + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<K> RecordKey for K where
    K: Clone + Debug + Eq + Hash + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Key extraction function.
///
/// Returning `None` means the key could not be derived; such fragments are
/// dropped with a warning.
pub type KeyFn<T, K> = Arc<dyn Fn(&T) -> Option<K> + Send + Sync>;

/// Short type name of a record schema, used in persisted metadata.
pub fn schema_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Serialize a record into its JSON object form.
///
/// Returns `None` when the record does not serialize to an object
/// (e.g. a bare scalar or sequence).
pub fn to_object<T: Serialize>(record: &T) -> Option<serde_json::Map<String, serde_json::Value>> {
    match serde_json::to_value(record) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    }
}
