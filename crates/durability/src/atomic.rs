//! Atomic file replacement
//!
//! Every snapshot file is written to a sibling temp file, fsynced, then
//! renamed over the target, so a crash leaves either the old file or the
//! new one, never a torn mix.

use std::io::{self, Write};
use std::path::Path;

/// Write `bytes` to `path` atomically (temp + fsync + rename).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot".to_string());
    let tmp_path = dir.join(format!(".{}.tmp", file_name));
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
