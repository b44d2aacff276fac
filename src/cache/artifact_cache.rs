//! Two-tier artifact resolution cache
//!
//! An in-process [`DashMap`] overlay sits in front of a [`PersistentIndex`].
//!
//! | Operation | Overlay | Index |
//! |-----------|---------|-------|
//! | store | insert first | write second |
//! | lookup | read; hit returns | read on miss, hit promoted |
//! | clear | remove second | remove first |
//!
//! The overlay is never invalidated by other processes: once promoted, an
//! entry stays visible here even if another process clears the index.

use super::entry::{ArtifactAtRepositoryKey, CachedArtifact};
use super::hash::DescriptorHash;
use super::serializer::{ArtifactAtRepositoryKeySerializer, CachedArtifactSerializer};
use super::time::BuildTimeProvider;
use crate::codec::IdentifierRegistry;
use crate::error::{ArtcacheError, ArtcacheResult};
use crate::index::{FileIndex, PersistentIndex};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Persistent store behind the overlay
pub type ArtifactIndex = dyn PersistentIndex<ArtifactAtRepositoryKey, CachedArtifact>;

/// Resolution outcomes for artifacts, per repository
pub struct ModuleArtifactCache {
    index: Box<ArtifactIndex>,
    time: Arc<dyn BuildTimeProvider>,
    overlay: DashMap<ArtifactAtRepositoryKey, CachedArtifact>,
}

impl ModuleArtifactCache {
    pub fn new(index: Box<ArtifactIndex>, time: Arc<dyn BuildTimeProvider>) -> Self {
        Self {
            index,
            time,
            overlay: DashMap::new(),
        }
    }

    /// Cache backed by a [`FileIndex`] at `path`, using the built-in identifier kinds
    pub fn open(path: impl Into<PathBuf>, time: Arc<dyn BuildTimeProvider>) -> Self {
        Self::open_with_registry(path, Arc::new(IdentifierRegistry::with_defaults()), time)
    }

    /// Like [`open`](Self::open), with a caller-supplied identifier registry
    pub fn open_with_registry(
        path: impl Into<PathBuf>,
        identifiers: Arc<IdentifierRegistry>,
        time: Arc<dyn BuildTimeProvider>,
    ) -> Self {
        let index = FileIndex::new(
            path,
            Arc::new(ArtifactAtRepositoryKeySerializer::new(identifiers)),
            Arc::new(CachedArtifactSerializer),
        );
        Self::new(Box::new(index), time)
    }

    /// Record that `key` resolved to `file`
    pub fn store(
        &self,
        key: &ArtifactAtRepositoryKey,
        file: &Path,
        descriptor_hash: DescriptorHash,
        cached_file_last_modified: i64,
    ) -> ArtcacheResult<()> {
        if key.repository_id().is_empty() {
            return Err(ArtcacheError::precondition("repository id must not be empty"));
        }
        if file.as_os_str().is_empty() {
            return Err(ArtcacheError::precondition("cached file path must not be empty"));
        }
        if file.to_str().is_none() {
            return Err(ArtcacheError::precondition(format!(
                "cached file path {} is not valid UTF-8",
                file.display()
            )));
        }

        let entry = CachedArtifact::present(
            file,
            self.time.current_time(),
            descriptor_hash,
            cached_file_last_modified,
        );
        self.write_through(key, entry)
    }

    /// Record that `key` could not be found at any of `attempted_locations`
    ///
    /// Unlike [`store`](Self::store) the key is not validated, so any key
    /// accepted by [`lookup`](Self::lookup) and [`clear`](Self::clear) can
    /// carry a negative entry.
    pub fn store_missing(
        &self,
        key: &ArtifactAtRepositoryKey,
        attempted_locations: Vec<String>,
        descriptor_hash: DescriptorHash,
    ) -> ArtcacheResult<()> {
        let entry =
            CachedArtifact::missing(attempted_locations, self.time.current_time(), descriptor_hash);
        self.write_through(key, entry)
    }

    pub fn lookup(&self, key: &ArtifactAtRepositoryKey) -> ArtcacheResult<Option<CachedArtifact>> {
        if let Some(entry) = self.overlay.get(key) {
            debug!("Overlay hit for {}", key);
            return Ok(Some(entry.value().clone()));
        }

        match self.index.lookup(key)? {
            Some(entry) => {
                debug!("Index hit for {}, promoting", key);
                // A store that landed while the index was read wins.
                let promoted = self.overlay.entry(key.clone()).or_insert(entry);
                Ok(Some(promoted.value().clone()))
            }
            None => {
                debug!("Cache miss for {}", key);
                Ok(None)
            }
        }
    }

    /// Forget `key` in both tiers
    pub fn clear(&self, key: &ArtifactAtRepositoryKey) -> ArtcacheResult<()> {
        self.index.clear(key)?;
        self.overlay.remove(key);
        debug!("Cleared {}", key);
        Ok(())
    }

    /// Entries currently held in memory
    pub fn overlay_len(&self) -> usize {
        self.overlay.len()
    }

    pub fn index(&self) -> &ArtifactIndex {
        self.index.as_ref()
    }

    fn write_through(&self, key: &ArtifactAtRepositoryKey, entry: CachedArtifact) -> ArtcacheResult<()> {
        self.overlay.insert(key.clone(), entry.clone());
        self.index.store(key, &entry)?;
        debug!(
            "Stored {} entry for {}",
            if entry.is_missing() { "missing" } else { "present" },
            key
        );
        Ok(())
    }
}

impl std::fmt::Debug for ModuleArtifactCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleArtifactCache")
            .field("overlay_len", &self.overlay.len())
            .finish_non_exhaustive()
    }
}
