//! Artcache - two-tier artifact resolution cache
//!
//! Records where dependency artifacts were found, or that they were not
//! found, in a concurrent in-memory overlay backed by a lock-protected index
//! file shared between processes.

pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod identifier;
pub mod index;

pub use cache::{ArtifactAtRepositoryKey, CachedArtifact, DescriptorHash, ModuleArtifactCache};
pub use error::{ArtcacheError, ArtcacheResult};
