//! Builder for `Memory`
//!
//! ```ignore
//! let memory = Memory::<Person, u32>::builder(|p: &Person| p.id)
//!     .strategy(MergeStrategy::LlmCustomRule)
//!     .rule("Keep the earliest birth date.")
//!     .remote_backend(backend)
//!     .search_backend(Arc::new(KeywordBackend::default()))
//!     .fields_for_index(["name", "bio"])
//!     .build()?;
//! ```

use crate::config::MemoryConfig;
use crate::factory::MergerOptions;
use crate::logging::init_tracing;
use crate::memory::Memory;
use concord_core::{KeyFn, Record, RecordKey, Result};
use concord_intelligence::{ApiMergeBackend, RemoteMergeBackend};
use concord_merge::{MergeStrategy, Merger};
use concord_search::SearchBackend;
use std::sync::Arc;
use std::time::Duration;

/// Step-by-step `Memory` configuration.
pub struct MemoryBuilder<T: Record, K: RecordKey> {
    key_of: KeyFn<T, K>,
    options: MergerOptions,
    merger: Option<Arc<dyn Merger<T>>>,
    search_backend: Option<Arc<dyn SearchBackend>>,
    fields_for_index: Vec<String>,
    verbose: bool,
}

impl<T: Record, K: RecordKey> MemoryBuilder<T, K> {
    /// Start from a key function with the default `field_merge` policy
    pub fn new<F>(key_of: F) -> Self
    where
        F: Fn(&T) -> Option<K> + Send + Sync + 'static,
    {
        Self {
            key_of: Arc::new(key_of),
            options: MergerOptions::default(),
            merger: None,
            search_backend: None,
            fields_for_index: Vec::new(),
            verbose: false,
        }
    }

    /// Start from a loaded `concord.toml`.
    ///
    /// A `[model]` section becomes the remote merge backend, and its
    /// `timeout_ms` bounds each remote batch call.
    ///
    /// # Errors
    ///
    /// `Error::Config` for an unknown strategy name.
    pub fn from_config<F>(key_of: F, config: &MemoryConfig) -> Result<Self>
    where
        F: Fn(&T) -> Option<K> + Send + Sync + 'static,
    {
        let mut builder = Self::new(key_of)
            .strategy(config.merge_strategy()?)
            .fields_for_index(config.fields_for_index.iter().cloned())
            .verbose(config.verbose);
        if let Some(rule) = &config.rule {
            builder = builder.rule(rule.clone());
        }
        if let Some(model) = &config.model {
            let backend = ApiMergeBackend::new(
                &model.endpoint,
                &model.model,
                model.api_key.as_deref(),
                model.timeout_ms,
            );
            builder = builder
                .remote_backend(Arc::new(backend))
                .merge_timeout(Duration::from_millis(model.timeout_ms));
        }
        Ok(builder)
    }

    /// Merge policy by name
    pub fn strategy(mut self, strategy: MergeStrategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    /// Use this merger instead of one built from the strategy
    pub fn merger(mut self, merger: Arc<dyn Merger<T>>) -> Self {
        self.merger = Some(merger);
        self
    }

    /// Remote backend for the `llm_*` strategies
    pub fn remote_backend(mut self, backend: Arc<dyn RemoteMergeBackend>) -> Self {
        self.options.remote = Some(backend);
        self
    }

    /// Rule text for `llm_custom_rule`
    pub fn rule(mut self, rule: impl Into<String>) -> Self {
        self.options.rule = Some(rule.into());
        self
    }

    /// Context re-evaluated on every `llm_custom_rule` batch
    pub fn dynamic_rule<F>(mut self, dynamic: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.options.dynamic_rule = Some(Arc::new(dynamic));
        self
    }

    /// Bound on one remote batch call
    pub fn merge_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Enable search with this backend
    pub fn search_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.search_backend = Some(backend);
        self
    }

    /// Fields rendered into search documents
    pub fn fields_for_index<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_for_index = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Install a DEBUG-level log subscriber on build
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build the memory.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the strategy is missing a remote backend or rule.
    pub fn build(self) -> Result<Memory<T, K>> {
        if self.verbose {
            init_tracing(true);
        }
        let merger = match self.merger {
            Some(merger) => merger,
            None => self.options.build::<T>()?,
        };
        Ok(Memory::from_parts(
            self.key_of,
            merger,
            self.search_backend,
            self.fields_for_index,
        ))
    }
}
