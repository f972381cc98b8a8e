//! Framing for the persisted search index blob
//!
//! # Format
//!
//! ```text
//! +--------+---------+--------+-------------------+
//! | "CNIX" | version | crc32  | payload ...       |
//! | 4 B    | u32 LE  | u32 LE | opaque index bytes|
//! +--------+---------+--------+-------------------+
//! ```
//!
//! The CRC covers the payload only.

/// Magic bytes for the index frame
pub const INDEX_MAGIC: &[u8; 4] = b"CNIX";
/// Current frame version
pub const INDEX_FRAME_VERSION: u32 = 1;
/// Header size: magic + version + crc
pub const INDEX_HEADER_SIZE: usize = 12;

/// Wrap an index payload in a frame.
pub fn encode_index_frame(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(INDEX_HEADER_SIZE + payload.len());
    buf.extend_from_slice(INDEX_MAGIC);
    buf.extend_from_slice(&INDEX_FRAME_VERSION.to_le_bytes());
    buf.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Validate a frame and return its payload.
pub fn decode_index_frame(data: &[u8]) -> Result<&[u8], FrameError> {
    if data.len() < INDEX_HEADER_SIZE {
        return Err(FrameError::TooShort {
            expected: INDEX_HEADER_SIZE,
            actual: data.len(),
        });
    }
    if &data[0..4] != INDEX_MAGIC {
        return Err(FrameError::InvalidMagic);
    }

    let version = read_u32(&data[4..8]);
    if version != INDEX_FRAME_VERSION {
        return Err(FrameError::UnsupportedVersion(version));
    }

    let stored = read_u32(&data[8..12]);
    let payload = &data[INDEX_HEADER_SIZE..];
    let computed = crc32fast::hash(payload);
    if stored != computed {
        return Err(FrameError::ChecksumMismatch { stored, computed });
    }
    Ok(payload)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

/// Errors that can occur when decoding an index frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// Data too short to contain a frame header.
    #[error("index frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// Minimum expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Magic bytes do not match "CNIX".
    #[error("invalid index frame magic")]
    InvalidMagic,

    /// Unsupported frame version.
    #[error("unsupported index frame version: {0}")]
    UnsupportedVersion(u32),

    /// CRC32 checksum mismatch.
    #[error("index checksum mismatch: stored={stored:#010x}, computed={computed:#010x}")]
    ChecksumMismatch {
        /// CRC stored in the frame
        stored: u32,
        /// CRC computed from the payload
        computed: u32,
    },
}

impl From<FrameError> for concord_core::Error {
    fn from(e: FrameError) -> Self {
        concord_core::Error::Corruption(e.to_string())
    }
}
