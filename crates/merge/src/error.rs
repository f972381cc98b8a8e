//! Errors reported by merge policies
//!
//! A `MergeError` never reaches the caller of `add`: the engine degrades
//! the affected pair to its incoming fragment and logs a warning.

use thiserror::Error;

/// Failure of a merge policy for one pair or one batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The policy rejected or could not handle the input
    #[error("policy failure: {0}")]
    Policy(String),

    /// A merged value did not match the record schema
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// The remote collaborator failed
    #[error("remote merge failed: {0}")]
    Remote(String),

    /// The remote collaborator did not answer in time
    #[error("remote merge timed out")]
    Timeout,

    /// A batch returned a different number of results than pairs submitted
    #[error("batch returned {actual} results for {expected} pairs")]
    LengthMismatch {
        /// Pairs submitted
        expected: usize,
        /// Results returned
        actual: usize,
    },
}
