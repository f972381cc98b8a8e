//! Memory engine for Concord
//!
//! This crate orchestrates all lower layers:
//! - Memory: the consolidating store facade (add, lookups, search, dump/load)
//! - MemoryBuilder: policy, search and logging setup
//! - MemoryConfig: `concord.toml` loading and defaults
//! - MergerOptions: strategy name to merger construction
//!
//! The engine is the only component that knows about:
//! - The single lock guarding store, lookups and search state
//! - Fast-path inserts vs. tournament merges
//! - Keeping lookups and the search index consistent with the store

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod factory;
pub mod logging;
pub mod memory;

pub use builder::MemoryBuilder;
pub use config::{MemoryConfig, ModelConfig, CONFIG_FILE_NAME};
pub use factory::MergerOptions;
pub use logging::init_tracing;
pub use memory::{AddReport, Memory};
