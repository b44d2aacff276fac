//! Single-file persistent index
//!
//! The whole index lives in one file, rewritten atomically (temp file plus
//! rename) under an exclusive lock on a sibling `.lock` file. Readers take a
//! shared lock on the same lock file. The lock file is never renamed, so the
//! lock stays valid across rewrites.
//!
//! # Layout
//!
//! ```text
//! "ACIX" | version (small int) | count (small int) | count × (key binary, value binary)
//! ```
//!
//! Records are keyed by the encoded key bytes, so two keys collide exactly
//! when their encodings are equal.

use super::lock::IndexLock;
use super::PersistentIndex;
use crate::codec::{self, BinaryEncoder, CodecResult, Decoder, Encoder, Serializer, SliceDecoder};
use crate::error::{ArtcacheError, ArtcacheResult};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const MAGIC: &[u8; 4] = b"ACIX";
const FORMAT_VERSION: u32 = 1;

type Records = BTreeMap<Vec<u8>, Vec<u8>>;

/// File-backed [`PersistentIndex`] with cross-process locking
pub struct FileIndex<K, V> {
    path: PathBuf,
    lock_path: PathBuf,
    key_serializer: Arc<dyn Serializer<K>>,
    value_serializer: Arc<dyn Serializer<V>>,
}

impl<K, V> FileIndex<K, V> {
    pub fn new(
        path: impl Into<PathBuf>,
        key_serializer: Arc<dyn Serializer<K>>,
        value_serializer: Arc<dyn Serializer<V>>,
    ) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, "lock");
        Self {
            path,
            lock_path,
            key_serializer,
            value_serializer,
        }
    }

    /// Index file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock file guarding the index
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Number of records
    pub fn len(&self) -> ArtcacheResult<usize> {
        let _lock = IndexLock::shared(&self.lock_path)?;
        Ok(self.read_records()?.len())
    }

    pub fn is_empty(&self) -> ArtcacheResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Decode every record, in encoded-key order
    pub fn entries(&self) -> ArtcacheResult<Vec<(K, V)>> {
        let _lock = IndexLock::shared(&self.lock_path)?;
        self.read_records()?
            .iter()
            .map(|(key, value)| -> ArtcacheResult<(K, V)> {
                Ok((
                    codec::from_bytes(self.key_serializer.as_ref(), key)?,
                    codec::from_bytes(self.value_serializer.as_ref(), value)?,
                ))
            })
            .collect()
    }

    fn encode_key(&self, key: &K) -> ArtcacheResult<Vec<u8>> {
        Ok(codec::to_bytes(self.key_serializer.as_ref(), key)?)
    }

    /// Load all records. Caller holds the lock.
    fn read_records(&self) -> ArtcacheResult<Records> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Records::new()),
            Err(e) => {
                return Err(ArtcacheError::io(
                    format!("reading cache index {}", self.path.display()),
                    e,
                ))
            }
        };

        parse_records(&bytes).map_err(|reason| ArtcacheError::IndexCorrupt {
            path: self.path.clone(),
            reason,
        })
    }

    /// Replace the index file with `records`. Caller holds the exclusive lock.
    fn write_records(&self, records: &Records) -> ArtcacheResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ArtcacheError::io(format!("creating index directory {}", parent.display()), e)
            })?;
        }

        let tmp = sibling(&self.path, "tmp");
        let file = File::create(&tmp)
            .map_err(|e| ArtcacheError::io(format!("creating {}", tmp.display()), e))?;

        let mut encoder = BinaryEncoder::new(BufWriter::new(file));
        write_records_to(&mut encoder, records)?;
        let file = encoder
            .finish()?
            .into_inner()
            .map_err(|e| ArtcacheError::io(format!("flushing {}", tmp.display()), e.into_error()))?;
        file.sync_all()
            .map_err(|e| ArtcacheError::io(format!("syncing {}", tmp.display()), e))?;

        fs::rename(&tmp, &self.path).map_err(|e| {
            ArtcacheError::io(
                format!("replacing cache index {}", self.path.display()),
                e,
            )
        })
    }
}

impl<K, V> PersistentIndex<K, V> for FileIndex<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn store(&self, key: &K, value: &V) -> ArtcacheResult<()> {
        let key = self.encode_key(key)?;
        let value = codec::to_bytes(self.value_serializer.as_ref(), value)?;

        let _lock = IndexLock::exclusive(&self.lock_path)?;
        let mut records = self.read_records()?;
        records.insert(key, value);
        self.write_records(&records)?;

        debug!("Stored index record in {} ({} total)", self.path.display(), records.len());
        Ok(())
    }

    fn lookup(&self, key: &K) -> ArtcacheResult<Option<V>> {
        let key = self.encode_key(key)?;

        let _lock = IndexLock::shared(&self.lock_path)?;
        let records = self.read_records()?;
        match records.get(&key) {
            Some(bytes) => Ok(Some(codec::from_bytes(self.value_serializer.as_ref(), bytes)?)),
            None => Ok(None),
        }
    }

    fn clear(&self, key: &K) -> ArtcacheResult<()> {
        let key = self.encode_key(key)?;

        let _lock = IndexLock::exclusive(&self.lock_path)?;
        let mut records = self.read_records()?;
        if records.remove(&key).is_some() {
            self.write_records(&records)?;
            debug!("Cleared index record in {}", self.path.display());
        }
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn write_records_to(encoder: &mut dyn Encoder, records: &Records) -> CodecResult<()> {
    encoder.write_bytes(MAGIC)?;
    encoder.write_small_int(FORMAT_VERSION)?;
    let count = u32::try_from(records.len())
        .map_err(|_| codec::CodecError::LengthOverflow(records.len()))?;
    encoder.write_small_int(count)?;
    for (key, value) in records {
        encoder.write_binary(key)?;
        encoder.write_binary(value)?;
    }
    Ok(())
}

fn parse_records(bytes: &[u8]) -> Result<Records, String> {
    let mut decoder = SliceDecoder::new(bytes);

    let mut magic = [0u8; 4];
    decoder
        .read_bytes(&mut magic)
        .map_err(|_| "file too short for header".to_string())?;
    if &magic != MAGIC {
        return Err("not an artifact cache index".to_string());
    }

    let version = decoder.read_small_int().map_err(|e| e.to_string())?;
    if version != FORMAT_VERSION {
        return Err(format!("unsupported format version {}", version));
    }

    let count = decoder.read_small_int().map_err(|e| e.to_string())?;
    let mut records = Records::new();
    for n in 0..count {
        let key = decoder
            .read_binary()
            .map_err(|e| format!("record {}: {}", n, e))?;
        let value = decoder
            .read_binary()
            .map_err(|e| format!("record {}: {}", n, e))?;
        records.insert(key, value);
    }

    if !decoder.is_exhausted() {
        return Err(format!(
            "{} trailing bytes after {} records",
            decoder.remaining_len(),
            count
        ));
    }
    Ok(records)
}
