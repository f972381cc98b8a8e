//! Core types and traits for Concord
//!
//! This crate defines the foundational types used throughout the system:
//! - Record: blanket trait for the caller-defined structured values being stored
//! - RecordKey: blanket trait for the identity extracted from a record
//! - KeyFn: shared key-extraction function
//! - LookupKey: hashable derived value used by secondary lookups
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lookup_key;
pub mod record;

pub use error::{Error, LookupError, Result};
pub use lookup_key::LookupKey;
pub use record::{schema_name, to_object, KeyFn, Record, RecordKey};
