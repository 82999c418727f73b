//! On-disk framing for store snapshots.
//!
//! A snapshot file is laid out as:
//! `[magic: 4][version: u16][crc32: u32][length: u64][payload: bincode(StoreSnapshot)]`
//! with all integers little-endian. The CRC covers the payload only.

use crate::error::{Result, VectorDbError};
use serde::{Deserialize, Serialize};

pub const MAGIC: &[u8; 4] = b"VSTO";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_SIZE: usize = 4 + 2 + 4 + 8;

/// Encode data to bincode bytes.
pub fn to_bincode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| VectorDbError::SerializationError(e.to_string()))
}

/// Decode data from bincode bytes.
pub fn from_bincode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    bincode::deserialize(bytes).map_err(|e| VectorDbError::SerializationError(e.to_string()))
}

/// Wrap a payload in the versioned, checksummed header.
pub fn encode(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Validate the header of `bytes` and return the payload it frames.
pub fn decode(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < HEADER_SIZE {
        return Err(VectorDbError::corrupt(format!(
            "file is {} bytes, shorter than the {}-byte header",
            bytes.len(),
            HEADER_SIZE
        )));
    }
    let (header, payload) = bytes.split_at(HEADER_SIZE);

    if &header[0..4] != MAGIC {
        return Err(VectorDbError::corrupt("bad magic, not a vector store file"));
    }

    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != FORMAT_VERSION {
        return Err(VectorDbError::corrupt(format!(
            "unsupported format version {}",
            version
        )));
    }

    let expected_crc = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    let mut len_buf = [0u8; 8];
    len_buf.copy_from_slice(&header[10..18]);
    let len = u64::from_le_bytes(len_buf);

    if len != payload.len() as u64 {
        return Err(VectorDbError::corrupt(format!(
            "header declares {} payload bytes, found {}",
            len,
            payload.len()
        )));
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(VectorDbError::corrupt("payload checksum mismatch"));
    }

    Ok(payload)
}
