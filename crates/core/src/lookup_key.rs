//! Derived lookup values
//!
//! A lookup maps a value derived from each record to the set of keys whose
//! records produce it. Bucket keys must be hashable, which rules out floats,
//! sequences and maps coming out of a record's JSON form.
//!
//! ## Equality
//!
//! Different variants are never equal: `Int(1) != Str("1")`.

use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hashable value produced by a lookup extractor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LookupKey {
    /// Boolean value
    Bool(bool),
    /// Integer; wide enough for any `i64` or `u64` id without loss
    Int(i128),
    /// UTF-8 string
    Str(String),
    /// Composite value built by the extractor
    Tuple(Vec<LookupKey>),
}

impl LookupKey {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            LookupKey::Bool(_) => "bool",
            LookupKey::Int(_) => "int",
            LookupKey::Str(_) => "str",
            LookupKey::Tuple(_) => "tuple",
        }
    }

    /// Get as str if this is a Str value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LookupKey::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value into a lookup key.
    ///
    /// `null` yields `Ok(None)` (the record is simply not indexed).
    /// Floats, arrays and objects are rejected as not hashable.
    pub fn from_json(value: &serde_json::Value) -> Result<Option<Self>, LookupError> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(LookupKey::Bool(*b))),
            Value::String(s) => Ok(Some(LookupKey::Str(s.clone()))),
            Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
                .map(|i| Some(LookupKey::Int(i)))
                .ok_or(LookupError::NotHashable("float")),
            Value::Array(_) => Err(LookupError::NotHashable("array")),
            Value::Object(_) => Err(LookupError::NotHashable("object")),
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Bool(b) => write!(f, "{}", b),
            LookupKey::Int(i) => write!(f, "{}", i),
            LookupKey::Str(s) => write!(f, "{}", s),
            LookupKey::Tuple(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for LookupKey {
    fn from(b: bool) -> Self {
        LookupKey::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LookupKey {
                fn from(i: $ty) -> Self {
                    LookupKey::Int(i as i128)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<String> for LookupKey {
    fn from(s: String) -> Self {
        LookupKey::Str(s)
    }
}

impl From<&str> for LookupKey {
    fn from(s: &str) -> Self {
        LookupKey::Str(s.to_string())
    }
}

impl From<&String> for LookupKey {
    fn from(s: &String) -> Self {
        LookupKey::Str(s.clone())
    }
}

impl<A: Into<LookupKey>, B: Into<LookupKey>> From<(A, B)> for LookupKey {
    fn from((a, b): (A, B)) -> Self {
        LookupKey::Tuple(vec![a.into(), b.into()])
    }
}
