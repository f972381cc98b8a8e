//! Merge policy backed by a remote reasoning collaborator
//!
//! `LlmMerger` overrides `batch_merge` so that one tournament round costs
//! one remote call no matter how many pairs it carries.
//!
//! # Failure handling
//!
//! - The backend call runs on a worker thread bounded by `timeout`
//! - A failed or timed-out call is retried once with the same batch
//! - If the retry fails too, every pair of the batch reports an error and
//!   the engine falls back to the incoming fragments
//! - A returned object that does not deserialize into the record type
//!   fails only its own pair

use super::prompt::{DynamicRule, Instruction};
use super::RemoteMergeBackend;
use crate::llm_client::{call_with_timeout, retry_once, LlmClientError};
use concord_core::Record;
use concord_merge::{MergeError, Merger};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on one remote batch call (30 seconds).
pub const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote reasoning merge policy for records of type `T`.
pub struct LlmMerger<T> {
    backend: Arc<dyn RemoteMergeBackend>,
    instruction: Instruction,
    timeout: Duration,
    _schema: PhantomData<fn() -> T>,
}

impl<T: Record> LlmMerger<T> {
    /// Create a merger with an explicit instruction
    pub fn new(backend: Arc<dyn RemoteMergeBackend>, instruction: Instruction) -> Self {
        Self {
            backend,
            instruction,
            timeout: DEFAULT_MERGE_TIMEOUT,
            _schema: PhantomData,
        }
    }

    /// No preference between existing and incoming
    pub fn balanced(backend: Arc<dyn RemoteMergeBackend>) -> Self {
        Self::new(backend, Instruction::Balanced)
    }

    /// Existing values win semantic conflicts
    pub fn prefer_existing(backend: Arc<dyn RemoteMergeBackend>) -> Self {
        Self::new(backend, Instruction::PreferExisting)
    }

    /// Incoming values win semantic conflicts
    pub fn prefer_incoming(backend: Arc<dyn RemoteMergeBackend>) -> Self {
        Self::new(backend, Instruction::PreferIncoming)
    }

    /// Caller-supplied merge rule
    pub fn custom_rule(backend: Arc<dyn RemoteMergeBackend>, rule: impl Into<String>) -> Self {
        Self::new(
            backend,
            Instruction::Custom {
                rule: rule.into(),
                dynamic: None,
            },
        )
    }

    /// Attach per-batch context to a custom rule.
    ///
    /// Ignored for the other instructions.
    pub fn with_dynamic_rule<F>(mut self, dynamic: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        if let Instruction::Custom { dynamic: slot, .. } = &mut self.instruction {
            *slot = Some(Arc::new(dynamic) as DynamicRule);
        }
        self
    }

    /// Override the bound on one backend call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound on one backend call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Instruction sent with every batch
    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    fn call_backend(
        &self,
        pairs: Arc<Vec<(Value, Value)>>,
        instruction: Arc<str>,
    ) -> Result<Vec<Value>, LlmClientError> {
        let backend = Arc::clone(&self.backend);
        call_with_timeout(self.timeout, move || {
            backend.batch_merge_remote(&pairs, &instruction)
        })
    }
}

impl<T: Record> Merger<T> for LlmMerger<T> {
    fn name(&self) -> &str {
        self.instruction.strategy_name()
    }

    fn pair_merge(&self, existing: &T, incoming: &T) -> Result<T, MergeError> {
        self.batch_merge(&[(existing.clone(), incoming.clone())])
            .pop()
            .unwrap_or_else(|| Err(MergeError::Remote("empty batch result".to_string())))
    }

    fn batch_merge(&self, pairs: &[(T, T)]) -> Vec<Result<T, MergeError>> {
        if pairs.is_empty() {
            return Vec::new();
        }

        let encoded: Result<Vec<(Value, Value)>, serde_json::Error> = pairs
            .iter()
            .map(|(existing, incoming)| {
                Ok((serde_json::to_value(existing)?, serde_json::to_value(incoming)?))
            })
            .collect();
        let encoded = match encoded {
            Ok(encoded) => Arc::new(encoded),
            Err(e) => {
                let err = MergeError::Schema(format!("failed to encode pair: {}", e));
                return vec![Err(err); pairs.len()];
            }
        };

        let instruction: Arc<str> = Arc::from(self.instruction.render());
        let expected = pairs.len();

        tracing::info!(
            target: "concord::llm_client",
            strategy = self.instruction.strategy_name(),
            pairs = expected,
            "Batch merging with a single remote call"
        );

        let outcome = retry_once(
            || self.call_backend(Arc::clone(&encoded), Arc::clone(&instruction)),
            |values: Vec<Value>| {
                if values.len() == expected {
                    Ok(values)
                } else {
                    Err(LlmClientError::Parse(format!(
                        "expected {} merged records, got {}",
                        expected,
                        values.len()
                    )))
                }
            },
            "merge",
        );

        match outcome {
            Ok(values) => values
                .into_iter()
                .map(|value| {
                    serde_json::from_value::<T>(value)
                        .map_err(|e| MergeError::Schema(e.to_string()))
                })
                .collect(),
            Err(e) => {
                tracing::error!(
                    target: "concord::llm_client",
                    strategy = self.instruction.strategy_name(),
                    pairs = expected,
                    error = %e,
                    "Remote batch merge failed"
                );
                let err = match e {
                    LlmClientError::Timeout => MergeError::Timeout,
                    other => MergeError::Remote(other.to_string()),
                };
                vec![Err(err); expected]
            }
        }
    }
}
