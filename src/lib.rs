//! Concord - self-consolidating associative record store
//!
//! Concord stores caller-defined records under a caller-defined key. Many
//! fragments describing the same key are consolidated into one canonical
//! record by a pluggable merge policy, from simple "keep existing" to a
//! remote reasoning model that merges a whole batch in one call.
//!
//! # Quick Start
//!
//! ```ignore
//! use concord::{Memory, MergeStrategy};
//!
//! #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
//! struct Person { id: u32, name: Option<String>, city: Option<String> }
//!
//! let memory = Memory::<Person, u32>::builder(|p: &Person| Some(p.id))
//!     .strategy(MergeStrategy::FieldMerge)
//!     .build()?;
//!
//! memory.add_one(Person { id: 1, name: Some("Ann".into()), city: None });
//! memory.add_one(Person { id: 1, name: None, city: Some("Oslo".into()) });
//! // get(&1) == Person { id: 1, name: Some("Ann"), city: Some("Oslo") }
//!
//! memory.create_field_lookup("by_city", "city")?;
//! let in_oslo = memory.get_by_lookup("by_city", "Oslo");
//! ```
//!
//! # Architecture
//!
//! All operations go through [`Memory`], which owns the canonical store,
//! the secondary lookups and the search state behind a single lock. Merge
//! policies, search backends and the remote merge backend are the
//! pluggable seams.

pub use concord_core::{
    schema_name, to_object, Error, KeyFn, LookupError, LookupKey, Record, RecordKey, Result,
};
pub use concord_durability::{SnapshotMetadata, SNAPSHOT_FORMAT_VERSION};
pub use concord_engine::{
    init_tracing, AddReport, Memory, MemoryBuilder, MemoryConfig, MergerOptions, ModelConfig,
    CONFIG_FILE_NAME,
};
pub use concord_intelligence::{
    ApiMergeBackend, DynamicRule, Instruction, LlmClientError, LlmMerger, RemoteMergeBackend,
    DEFAULT_MERGE_TIMEOUT,
};
pub use concord_merge::{
    rounds_for, FieldMerge, KeepExisting, KeepIncoming, MergeEngine, MergeError, MergeStrategy,
    Merger, ReduceReport,
};
pub use concord_search::{KeywordBackend, SearchBackend, SearchDocument, SearchIndex};
