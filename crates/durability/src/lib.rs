//! Persistence layer for Concord
//!
//! Explicit, standalone snapshots of a store into a directory. Every
//! failure here is a hard error for the caller; nothing is retried or
//! silently skipped.
//!
//! This crate provides:
//! - write_snapshot / read_records / read_metadata / read_index
//! - SnapshotMetadata: the `metadata.json` descriptor
//! - Index blob framing with magic, version and CRC32
//! - Atomic file replacement (temp + fsync + rename)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atomic;
pub mod frame;
pub mod metadata;
pub mod snapshot;

pub use atomic::write_atomic;
pub use frame::{decode_index_frame, encode_index_frame, FrameError};
pub use metadata::{SnapshotMetadata, SNAPSHOT_FORMAT_VERSION};
pub use snapshot::{
    read_index, read_metadata, read_records, write_snapshot, SnapshotPaths, INDEX_FILE,
    MEMORY_FILE, METADATA_FILE,
};
