//! Named merge strategies
//!
//! Used by configuration files and builders to select a policy by name.
//! Classic strategies are built by this crate; the `llm_*` strategies need
//! a remote merge backend and are built by the engine's merger factory.

use std::fmt;
use std::str::FromStr;

/// Merge strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MergeStrategy {
    /// Keep the existing record (alias: `keep_old`)
    KeepExisting,
    /// Keep the incoming record (alias: `keep_new`)
    KeepIncoming,
    /// Field-level merge, incoming overrides what it sets
    #[default]
    FieldMerge,
    /// Remote reasoning, no preference on conflicts
    LlmBalanced,
    /// Remote reasoning, prefer existing values on conflicts
    LlmPreferExisting,
    /// Remote reasoning, prefer incoming values on conflicts
    LlmPreferIncoming,
    /// Remote reasoning driven by a caller-supplied rule
    LlmCustomRule,
}

impl MergeStrategy {
    /// All strategies, in declaration order
    pub const ALL: [MergeStrategy; 7] = [
        MergeStrategy::KeepExisting,
        MergeStrategy::KeepIncoming,
        MergeStrategy::FieldMerge,
        MergeStrategy::LlmBalanced,
        MergeStrategy::LlmPreferExisting,
        MergeStrategy::LlmPreferIncoming,
        MergeStrategy::LlmCustomRule,
    ];

    /// Canonical configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::KeepExisting => "keep_existing",
            MergeStrategy::KeepIncoming => "keep_incoming",
            MergeStrategy::FieldMerge => "field_merge",
            MergeStrategy::LlmBalanced => "llm_balanced",
            MergeStrategy::LlmPreferExisting => "llm_prefer_existing",
            MergeStrategy::LlmPreferIncoming => "llm_prefer_incoming",
            MergeStrategy::LlmCustomRule => "llm_custom_rule",
        }
    }

    /// Whether the strategy delegates to a remote merge backend
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            MergeStrategy::LlmBalanced
                | MergeStrategy::LlmPreferExisting
                | MergeStrategy::LlmPreferIncoming
                | MergeStrategy::LlmCustomRule
        )
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep_existing" | "keep_old" => Ok(MergeStrategy::KeepExisting),
            "keep_incoming" | "keep_new" => Ok(MergeStrategy::KeepIncoming),
            "field_merge" => Ok(MergeStrategy::FieldMerge),
            "llm_balanced" => Ok(MergeStrategy::LlmBalanced),
            "llm_prefer_existing" => Ok(MergeStrategy::LlmPreferExisting),
            "llm_prefer_incoming" => Ok(MergeStrategy::LlmPreferIncoming),
            "llm_custom_rule" => Ok(MergeStrategy::LlmCustomRule),
            other => Err(format!(
                "Unknown merge strategy '{}'. Expected one of: {}",
                other,
                MergeStrategy::ALL
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}
