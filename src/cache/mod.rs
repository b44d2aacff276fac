//! Artifact resolution cache
//!
//! Remembers, per repository, where an artifact was found (a cached file) or
//! that it was not found anywhere (a negative entry listing the locations
//! tried). Every entry carries the descriptor hash it was resolved against,
//! so callers can tell when a changed module descriptor makes it stale.
//!
//! # Entry States
//!
//! | State | Holds | Meaning |
//! |-------|-------|---------|
//! | Present | file, last-modified | Artifact was downloaded to this file |
//! | Missing | attempted locations | Every location was tried and failed |

pub mod artifact_cache;
pub mod entry;
pub mod hash;
pub mod serializer;
pub mod time;

pub use artifact_cache::{ArtifactIndex, ModuleArtifactCache};
pub use entry::{ArtifactAtRepositoryKey, CachedArtifact};
pub use hash::DescriptorHash;
pub use serializer::{ArtifactAtRepositoryKeySerializer, CachedArtifactSerializer};
pub use time::{BuildCommencedTime, BuildTimeProvider, FixedTime};
