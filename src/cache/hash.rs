//! Module descriptor hashes
//!
//! A descriptor hash is an arbitrary-precision signed integer. It is kept in
//! its canonical wire form: the shortest big-endian two's-complement byte
//! string that represents the value (zero is a single `0x00` byte). Two
//! hashes are equal exactly when their canonical bytes are equal.

use crate::error::{ArtcacheError, ArtcacheResult};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;

/// Opaque hash of a module descriptor at cache-write time
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DescriptorHash(Vec<u8>);

impl DescriptorHash {
    pub fn zero() -> Self {
        Self(vec![0])
    }

    /// Build from big-endian two's-complement bytes, in any (non-empty) width
    pub fn from_signed_bytes_be(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(Self(canonical(bytes).to_vec()))
    }

    /// Build the non-negative integer whose magnitude is `digest`
    pub fn from_unsigned_digest(digest: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(digest.len() + 1);
        bytes.push(0);
        bytes.extend_from_slice(digest);
        Self(canonical(&bytes).to_vec())
    }

    /// SHA-256 of a descriptor file, as a non-negative integer
    pub fn of_file(path: &Path) -> ArtcacheResult<Self> {
        let contents = fs::read(path).map_err(|e| {
            ArtcacheError::io(format!("reading descriptor {}", path.display()), e)
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        Ok(Self::from_unsigned_digest(&hasher.finalize()))
    }

    /// Canonical big-endian two's-complement bytes
    pub fn to_signed_bytes_be(&self) -> &[u8] {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0[0] & 0x80 != 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0]
    }
}

/// Drop leading bytes that only repeat the sign.
fn canonical(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let next_negative = bytes[start + 1] & 0x80 != 0;
        match bytes[start] {
            0x00 if !next_negative => start += 1,
            0xff if next_negative => start += 1,
            _ => break,
        }
    }
    &bytes[start..]
}

impl From<i64> for DescriptorHash {
    fn from(value: i64) -> Self {
        Self(canonical(&value.to_be_bytes()).to_vec())
    }
}

impl From<i128> for DescriptorHash {
    fn from(value: i128) -> Self {
        Self(canonical(&value.to_be_bytes()).to_vec())
    }
}

impl fmt::Display for DescriptorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for DescriptorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DescriptorHash(0x{})", self)
    }
}

impl Serialize for DescriptorHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
