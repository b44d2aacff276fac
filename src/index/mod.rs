//! Durable, cross-process key-value index
//!
//! The two-tier cache delegates every persistent read and write to a
//! [`PersistentIndex`]. Implementations own their locking: each call acquires
//! whatever cross-process lock it needs and releases it before returning,
//! including on error.

pub mod file;
pub mod lock;

pub use file::FileIndex;
pub use lock::{IndexLock, LockMode};

use crate::error::ArtcacheResult;

/// Persistent map from keys to values, shared between processes
pub trait PersistentIndex<K, V>: Send + Sync {
    /// Insert or replace the value for `key`
    fn store(&self, key: &K, value: &V) -> ArtcacheResult<()>;

    fn lookup(&self, key: &K) -> ArtcacheResult<Option<V>>;

    /// Remove `key`; absent keys are not an error
    fn clear(&self, key: &K) -> ArtcacheResult<()>;
}
