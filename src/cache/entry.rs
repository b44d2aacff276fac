//! Cache keys and entries

use super::hash::DescriptorHash;
use crate::identifier::ArtifactIdentifier;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An artifact as seen through one repository
#[derive(Debug, Clone, Hash)]
pub struct ArtifactAtRepositoryKey {
    repository_id: String,
    artifact_id: Arc<dyn ArtifactIdentifier>,
}

impl ArtifactAtRepositoryKey {
    pub fn new(repository_id: impl Into<String>, artifact_id: Arc<dyn ArtifactIdentifier>) -> Self {
        Self {
            repository_id: repository_id.into(),
            artifact_id,
        }
    }

    /// Key for a concrete identifier value
    pub fn of<T: ArtifactIdentifier>(repository_id: impl Into<String>, artifact_id: T) -> Self {
        Self::new(repository_id, Arc::new(artifact_id))
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    pub fn artifact_id(&self) -> &Arc<dyn ArtifactIdentifier> {
        &self.artifact_id
    }
}

impl PartialEq for ArtifactAtRepositoryKey {
    fn eq(&self, other: &Self) -> bool {
        self.repository_id == other.repository_id
            && self.artifact_id.eq_identifier(other.artifact_id.as_ref())
    }
}

impl Eq for ArtifactAtRepositoryKey {}

impl fmt::Display for ArtifactAtRepositoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.artifact_id, self.repository_id)
    }
}

/// What resolution found for an artifact: a local file, or nothing
///
/// Entries are replaced wholesale; a later store for the same key never
/// merges with an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CachedArtifact {
    /// Resolved to a file in the local cache
    Present {
        cached_file: PathBuf,
        cached_at: i64,
        descriptor_hash: DescriptorHash,
        cached_file_last_modified: i64,
    },
    /// Looked for and not found at any of `attempted_locations`
    Missing {
        attempted_locations: Vec<String>,
        cached_at: i64,
        descriptor_hash: DescriptorHash,
    },
}

impl CachedArtifact {
    pub fn present(
        cached_file: impl Into<PathBuf>,
        cached_at: i64,
        descriptor_hash: DescriptorHash,
        cached_file_last_modified: i64,
    ) -> Self {
        Self::Present {
            cached_file: cached_file.into(),
            cached_at,
            descriptor_hash,
            cached_file_last_modified,
        }
    }

    pub fn missing(
        attempted_locations: Vec<String>,
        cached_at: i64,
        descriptor_hash: DescriptorHash,
    ) -> Self {
        Self::Missing {
            attempted_locations,
            cached_at,
            descriptor_hash,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    /// Build time (epoch millis) at which the entry was written
    pub fn cached_at(&self) -> i64 {
        match self {
            Self::Present { cached_at, .. } | Self::Missing { cached_at, .. } => *cached_at,
        }
    }

    pub fn descriptor_hash(&self) -> &DescriptorHash {
        match self {
            Self::Present {
                descriptor_hash, ..
            }
            | Self::Missing {
                descriptor_hash, ..
            } => descriptor_hash,
        }
    }

    pub fn cached_file(&self) -> Option<&Path> {
        match self {
            Self::Present { cached_file, .. } => Some(cached_file),
            Self::Missing { .. } => None,
        }
    }

    pub fn cached_file_last_modified(&self) -> Option<i64> {
        match self {
            Self::Present {
                cached_file_last_modified,
                ..
            } => Some(*cached_file_last_modified),
            Self::Missing { .. } => None,
        }
    }

    /// Locations tried, in resolution order; empty for present entries
    pub fn attempted_locations(&self) -> &[String] {
        match self {
            Self::Present { .. } => &[],
            Self::Missing {
                attempted_locations,
                ..
            } => attempted_locations,
        }
    }
}
