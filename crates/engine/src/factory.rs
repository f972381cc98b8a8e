//! Merger construction from a `MergeStrategy`
//!
//! Classic strategies need nothing else. The `llm_*` strategies need a
//! remote merge backend, and `llm_custom_rule` also needs its rule text;
//! a missing piece is a configuration error, never a silent downgrade.

use concord_core::{Error, Record, Result};
use concord_intelligence::{
    DynamicRule, Instruction, LlmMerger, RemoteMergeBackend, DEFAULT_MERGE_TIMEOUT,
};
use concord_merge::{FieldMerge, KeepExisting, KeepIncoming, MergeStrategy, Merger};
use std::sync::Arc;
use std::time::Duration;

/// Everything needed to build a merger by strategy name.
#[derive(Clone)]
pub struct MergerOptions {
    /// Selected strategy
    pub strategy: MergeStrategy,
    /// Backend for the `llm_*` strategies
    pub remote: Option<Arc<dyn RemoteMergeBackend>>,
    /// Rule text for `llm_custom_rule`
    pub rule: Option<String>,
    /// Per-batch context for `llm_custom_rule`
    pub dynamic_rule: Option<DynamicRule>,
    /// Bound on one remote batch call
    pub timeout: Duration,
}

impl Default for MergerOptions {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::default(),
            remote: None,
            rule: None,
            dynamic_rule: None,
            timeout: DEFAULT_MERGE_TIMEOUT,
        }
    }
}

impl MergerOptions {
    /// Build the merger for records of type `T`.
    ///
    /// # Errors
    ///
    /// `Error::Config` when an `llm_*` strategy has no remote backend, or
    /// `llm_custom_rule` has no (or a blank) rule.
    pub fn build<T: Record>(&self) -> Result<Arc<dyn Merger<T>>> {
        let instruction = match self.strategy {
            MergeStrategy::KeepExisting => return Ok(Arc::new(KeepExisting)),
            MergeStrategy::KeepIncoming => return Ok(Arc::new(KeepIncoming)),
            MergeStrategy::FieldMerge => return Ok(Arc::new(FieldMerge)),
            MergeStrategy::LlmBalanced => Instruction::Balanced,
            MergeStrategy::LlmPreferExisting => Instruction::PreferExisting,
            MergeStrategy::LlmPreferIncoming => Instruction::PreferIncoming,
            MergeStrategy::LlmCustomRule => {
                let rule = self
                    .rule
                    .as_deref()
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| {
                        Error::Config(format!("strategy '{}' requires a rule", self.strategy))
                    })?;
                Instruction::Custom {
                    rule: rule.to_string(),
                    dynamic: self.dynamic_rule.clone(),
                }
            }
        };

        let backend = self.remote.clone().ok_or_else(|| {
            Error::Config(format!(
                "strategy '{}' requires a remote merge backend (configure [model] or pass one to the builder)",
                self.strategy
            ))
        })?;

        Ok(Arc::new(
            LlmMerger::<T>::new(backend, instruction).with_timeout(self.timeout),
        ))
    }
}
