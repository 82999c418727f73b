//! Stable content hashing of vectors, used for deduplication.

use sha2::{Digest, Sha256};
use std::fmt;

/// Number of decimal places each component is rounded to before hashing.
///
/// Two vectors whose components agree after rounding to this many places
/// produce the same hash.
pub const HASH_PRECISION: i32 = 6;

/// A SHA-256 digest of a quantized vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Round to [`HASH_PRECISION`] places and return the bit pattern of the
/// result. Every `f32` stays finite after scaling in `f64`, so distinct
/// large values keep distinct patterns. `-0.0` folds to `0.0` and every NaN
/// to one canonical NaN.
fn quantize(x: f32) -> u64 {
    if x.is_nan() {
        return f64::NAN.to_bits();
    }
    let scale = 10f64.powi(HASH_PRECISION);
    let rounded = (f64::from(x) * scale).round();
    if rounded == 0.0 {
        0.0f64.to_bits()
    } else {
        rounded.to_bits()
    }
}

/// Hash a vector's values after quantizing them to [`HASH_PRECISION`] places.
pub fn content_hash(v: &[f32]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update((v.len() as u64).to_le_bytes());
    for &x in v {
        hasher.update(quantize(x).to_le_bytes());
    }
    ContentHash(hasher.finalize().into())
}
