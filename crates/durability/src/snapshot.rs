//! Directory snapshots
//!
//! A snapshot directory holds:
//!
//! | File | Content |
//! |------|---------|
//! | `memory.json` | JSON list of canonical records, in store order |
//! | `metadata.json` | `SnapshotMetadata` descriptor |
//! | `index.bin` | framed search index blob, only when an index was built |
//!
//! Each file is replaced atomically. Writing a snapshot without an index
//! removes any `index.bin` left by an earlier snapshot so a stale index is
//! never restored next to newer records.

use crate::atomic::write_atomic;
use crate::frame::{decode_index_frame, encode_index_frame};
use crate::metadata::SnapshotMetadata;
use concord_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Canonical records file
pub const MEMORY_FILE: &str = "memory.json";
/// Metadata descriptor file
pub const METADATA_FILE: &str = "metadata.json";
/// Search index blob file
pub const INDEX_FILE: &str = "index.bin";

/// Paths of the files inside one snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    root: PathBuf,
}

impl SnapshotPaths {
    /// Paths rooted at `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            root: dir.as_ref().to_path_buf(),
        }
    }

    /// Snapshot directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `memory.json`
    pub fn memory(&self) -> PathBuf {
        self.root.join(MEMORY_FILE)
    }

    /// `metadata.json`
    pub fn metadata(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// `index.bin`
    pub fn index(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }
}

/// Write a complete snapshot into `dir`, creating it if needed.
pub fn write_snapshot<T: Serialize>(
    dir: &Path,
    records: &[&T],
    metadata: &SnapshotMetadata,
    index: Option<&[u8]>,
) -> Result<()> {
    let paths = SnapshotPaths::new(dir);
    std::fs::create_dir_all(paths.root())?;

    let memory = serde_json::to_vec_pretty(records)?;
    write_atomic(&paths.memory(), &memory)?;

    let meta = serde_json::to_vec_pretty(metadata)?;
    write_atomic(&paths.metadata(), &meta)?;

    match index {
        Some(payload) => {
            write_atomic(&paths.index(), &encode_index_frame(payload))?;
        }
        None => match std::fs::remove_file(paths.index()) {
            Ok(()) => {
                tracing::debug!(target: "concord::durability", dir = %dir.display(), "Removed stale index blob");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::Io(e)),
        },
    }

    tracing::info!(
        target: "concord::durability",
        dir = %dir.display(),
        records = records.len(),
        with_index = index.is_some(),
        "Snapshot written"
    );
    Ok(())
}

/// Read the canonical records of a snapshot.
///
/// A missing `memory.json` is `Error::NotFound`; a malformed one is
/// `Error::Serialization`.
pub fn read_records<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let path = SnapshotPaths::new(dir).memory();
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Error::NotFound(path)),
        Err(e) => return Err(Error::Io(e)),
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e)))
}

/// Read the metadata descriptor. `Ok(None)` if the file does not exist.
pub fn read_metadata(dir: &Path) -> Result<Option<SnapshotMetadata>> {
    let path = SnapshotPaths::new(dir).metadata();
    match std::fs::read(&path) {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::Serialization(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Read and validate the index blob. `Ok(None)` if the file does not exist.
pub fn read_index(dir: &Path) -> Result<Option<Vec<u8>>> {
    let path = SnapshotPaths::new(dir).index();
    match std::fs::read(&path) {
        Ok(bytes) => Ok(Some(decode_index_frame(&bytes)?.to_vec())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Io(e)),
    }
}
