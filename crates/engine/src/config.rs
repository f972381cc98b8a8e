//! Memory configuration via `concord.toml`
//!
//! Selects the merge strategy, the fields rendered for search, and the
//! optional remote model endpoint used by the `llm_*` strategies.

use concord_core::{Error, Result};
use concord_merge::MergeStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "concord.toml";

/// `[model]` section: the endpoint behind the `llm_*` strategies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible server; `/chat/completions` is appended
    pub endpoint: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Bearer token, if the server wants one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Bound on one merge batch, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// Memory configuration loaded from `concord.toml`.
///
/// # Example
///
/// ```toml
/// strategy = "llm_custom_rule"
/// fields_for_index = ["name", "bio"]
/// rule = "Keep the earliest birth date; prefer incoming job titles."
///
/// [model]
/// endpoint = "http://localhost:11434/v1"
/// model = "qwen3:1.7b"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    /// Merge strategy name (see `MergeStrategy`)
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Fields rendered into search documents; empty means the whole record
    #[serde(default)]
    pub fields_for_index: Vec<String>,
    /// Merge rule for `llm_custom_rule`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Install a DEBUG-level log subscriber on build
    #[serde(default)]
    pub verbose: bool,
    /// Optional remote model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,
}

fn default_strategy() -> String {
    MergeStrategy::default().as_str().to_string()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            fields_for_index: Vec::new(),
            rule: None,
            verbose: false,
            model: None,
        }
    }
}

impl MemoryConfig {
    /// Parse the strategy string into a `MergeStrategy`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an unknown strategy name.
    pub fn merge_strategy(&self) -> Result<MergeStrategy> {
        self.strategy
            .parse::<MergeStrategy>()
            .map_err(|e| Error::Config(format!("{} (in {})", e, CONFIG_FILE_NAME)))
    }

    /// Commented template written by `write_default_if_missing`.
    pub fn default_toml() -> &'static str {
        r#"# Concord memory configuration
#
# Merge strategy (default: "field_merge"):
#   "keep_existing"       = first fragment wins (alias "keep_old")
#   "keep_incoming"       = last fragment wins (alias "keep_new")
#   "field_merge"         = incoming fills gaps and overrides the fields it sets
#   "llm_balanced"        = remote model merges, no preference
#   "llm_prefer_existing" = remote model merges, existing wins conflicts
#   "llm_prefer_incoming" = remote model merges, incoming wins conflicts
#   "llm_custom_rule"     = remote model merges following `rule`
strategy = "field_merge"

# Fields rendered for search; empty = whole record as JSON
fields_for_index = []

# Merge rule for "llm_custom_rule"
# rule = "Prefer newer emails from incoming data. Keep existing names."

# Debug logging (default: false)
verbose = false

# Remote model for the llm_* strategies.
# [model]
# endpoint = "http://localhost:11434/v1"
# model = "qwen3:1.7b"
# api_key = "your-api-key"      # optional
# timeout_ms = 30000             # optional, default 30000
"#
    }

    /// Load `concord.toml` from `path`.
    ///
    /// # Errors
    ///
    /// `Error::Config` when the file is unreadable, is not valid TOML, or
    /// names an unknown strategy.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| file_error("read", path, e))?;
        let config: MemoryConfig =
            toml::from_str(&content).map_err(|e| file_error("parse", path, e))?;
        config.merge_strategy()?;
        Ok(config)
    }

    /// Create `path` with `default_toml()` unless something is already there.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        std::fs::write(path, Self::default_toml()).map_err(|e| file_error("write", path, e))
    }

    /// Persist this config as TOML, replacing `path`.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("cannot encode config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| file_error("write", path, e))
    }
}

fn file_error(action: &str, path: &Path, e: impl std::fmt::Display) -> Error {
    Error::Config(format!("cannot {} '{}': {}", action, path.display(), e))
}
