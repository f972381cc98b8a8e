//! Error types for Concord
//!
//! This module defines the hard errors surfaced by the public API.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Most failure modes inside the system recover locally (dropped fragments,
//! skipped lookup entries, fail-closed merges) and are only logged. The
//! variants here cover what the caller has to handle: schema violations on
//! dynamic input, lookup registration conflicts, missing search support,
//! persistence I/O and configuration problems.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Concord operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Concord
#[derive(Debug, Error)]
pub enum Error {
    /// Input did not match the record schema; the whole call was aborted
    #[error("Schema violation at item {index}: {reason}")]
    SchemaViolation {
        /// Position of the offending item in the submitted batch
        index: usize,
        /// Deserializer message
        reason: String,
    },

    /// A lookup with this name is already registered
    #[error("Lookup '{0}' already exists; drop it before re-creating")]
    DuplicateLookup(String),

    /// No search backend was configured
    #[error("Search unavailable: no search backend configured")]
    SearchUnavailable,

    /// The search backend failed to build or restore an index
    #[error("Search error: {0}")]
    Search(String),

    /// A persisted file is missing
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persisted data failed an integrity check
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Failure to derive a lookup value from a record.
///
/// Never fatal: the record is skipped for that lookup only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The derived value cannot be used as a bucket key
    #[error("value of type {0} is not hashable")]
    NotHashable(&'static str),

    /// The extractor itself failed
    #[error("extraction failed: {0}")]
    Extraction(String),
}
