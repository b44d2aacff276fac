//! Error types for artcache
//!
//! All modules use `ArtcacheResult<T>` as their return type. Wire-level
//! failures live in [`CodecError`] and are wrapped here so that callers see
//! one error type per operation.

use crate::codec::CodecError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for artcache operations
pub type ArtcacheResult<T> = Result<T, ArtcacheError>;

/// All errors that can occur in artcache
#[derive(Error, Debug)]
pub enum ArtcacheError {
    // Caller errors
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Invalid artifact identifier: {0}")]
    InvalidIdentifier(String),

    // Wire format errors
    #[error("Decode error: {0}")]
    Codec(#[from] CodecError),

    // Persistent index errors
    #[error("Failed to lock cache index {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache index {path} is corrupt: {reason}")]
    IndexCorrupt { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ArtcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a precondition error
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition(reason.into())
    }

    /// Whether the error means the persistent store holds unreadable data.
    ///
    /// Callers should treat the backing store as unavailable for the entry
    /// and rebuild it rather than treat the failure as a cache miss.
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::Codec(e) => e.is_malformed_input(),
            Self::IndexCorrupt { .. } => true,
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            _ if self.is_corruption() => {
                Some("Delete the cache index file to rebuild it on the next resolution")
            }
            Self::Lock { .. } => Some("Check that no other build holds the cache lock"),
            Self::InvalidIdentifier(_) => {
                Some("Use group:module:version for --module and name:type[:ext[:classifier]] for --artifact")
            }
            _ => None,
        }
    }
}
