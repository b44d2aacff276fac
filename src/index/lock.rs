//! Advisory file locks scoped to a guard

use crate::error::{ArtcacheError, ArtcacheResult};
use fs4::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Lock flavour: many readers or one writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// Held advisory lock on a lock file; released on drop
#[derive(Debug)]
pub struct IndexLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl IndexLock {
    /// Block until a shared lock on `path` is held
    pub fn shared(path: &Path) -> ArtcacheResult<Self> {
        Self::acquire(path, LockMode::Shared)
    }

    /// Block until an exclusive lock on `path` is held
    pub fn exclusive(path: &Path) -> ArtcacheResult<Self> {
        Self::acquire(path, LockMode::Exclusive)
    }

    fn acquire(path: &Path, mode: LockMode) -> ArtcacheResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ArtcacheError::io(format!("creating lock directory {}", parent.display()), e)
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| ArtcacheError::io(format!("opening lock file {}", path.display()), e))?;

        let locked = match mode {
            LockMode::Shared => FileExt::lock_shared(&file),
            LockMode::Exclusive => FileExt::lock_exclusive(&file),
        };
        locked.map_err(|source| ArtcacheError::Lock {
            path: path.to_path_buf(),
            source,
        })?;

        trace!("Acquired {:?} lock on {}", mode, path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
            mode,
        })
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
        trace!("Released {:?} lock on {}", self.mode, self.path.display());
    }
}
