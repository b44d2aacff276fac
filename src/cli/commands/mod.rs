//! CLI command implementations

pub mod clear;
pub mod config;
pub mod list;
pub mod lookup;
pub mod store;
pub mod store_missing;

pub use clear::execute as clear;
pub use config::execute as config;
pub use list::execute as list;
pub use lookup::execute as lookup;
pub use store::execute as store;
pub use store_missing::execute as store_missing;

use crate::cache::{
    ArtifactAtRepositoryKey, ArtifactAtRepositoryKeySerializer, BuildCommencedTime,
    CachedArtifact, CachedArtifactSerializer, DescriptorHash, ModuleArtifactCache,
};
use crate::cli::args::{ArtifactArgs, DescriptorArgs};
use crate::config::Config;
use crate::error::{ArtcacheError, ArtcacheResult};
use crate::identifier::{
    IvyArtifactName, ModuleComponentArtifactIdentifier, ModuleComponentFileArtifactIdentifier,
    ModuleComponentIdentifier,
};
use crate::index::FileIndex;
use std::sync::Arc;
use tracing::debug;

/// Open the two-tier cache over the configured index file
fn open_cache(config: &Config) -> ModuleArtifactCache {
    let path = config.cache.index_path();
    debug!("Using cache index {}", path.display());
    ModuleArtifactCache::open(path, Arc::new(BuildCommencedTime::now()))
}

/// Open the configured index file directly, bypassing the overlay
fn open_index(config: &Config) -> FileIndex<ArtifactAtRepositoryKey, CachedArtifact> {
    FileIndex::new(
        config.cache.index_path(),
        Arc::new(ArtifactAtRepositoryKeySerializer::default()),
        Arc::new(CachedArtifactSerializer),
    )
}

/// Build the cache key named on the command line
fn artifact_key(args: &ArtifactArgs) -> ArtcacheResult<ArtifactAtRepositoryKey> {
    let component = ModuleComponentIdentifier::parse(&args.module)?;

    match (&args.artifact, &args.file_name) {
        (Some(artifact), None) => Ok(ArtifactAtRepositoryKey::of(
            args.repo.as_str(),
            ModuleComponentArtifactIdentifier::new(component, IvyArtifactName::parse(artifact)?),
        )),
        (None, Some(file_name)) if !file_name.is_empty() => Ok(ArtifactAtRepositoryKey::of(
            args.repo.as_str(),
            ModuleComponentFileArtifactIdentifier::new(component, file_name.as_str()),
        )),
        _ => Err(ArtcacheError::InvalidIdentifier(
            "give exactly one of --artifact or a non-empty --file-name".to_string(),
        )),
    }
}

/// Resolve the descriptor hash; zero when none is given
fn descriptor_hash(args: &DescriptorArgs) -> ArtcacheResult<DescriptorHash> {
    if let Some(path) = &args.descriptor {
        return DescriptorHash::of_file(path);
    }

    match &args.descriptor_hash {
        Some(text) => {
            let bytes = hex::decode(text.trim_start_matches("0x")).map_err(|e| {
                ArtcacheError::precondition(format!("invalid descriptor hash '{}': {}", text, e))
            })?;
            DescriptorHash::from_signed_bytes_be(&bytes).ok_or_else(|| {
                ArtcacheError::precondition("descriptor hash must not be empty")
            })
        }
        None => Ok(DescriptorHash::zero()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(artifact: Option<&str>, file_name: Option<&str>) -> ArtifactArgs {
        ArtifactArgs {
            repo: "maven".to_string(),
            module: "org.example:lib:1.0".to_string(),
            artifact: artifact.map(String::from),
            file_name: file_name.map(String::from),
        }
    }

    #[test]
    fn key_from_artifact_name() {
        let key = artifact_key(&args(Some("lib:jar::sources"), None)).unwrap();
        assert_eq!(key.repository_id(), "maven");
        assert_eq!(
            key,
            ArtifactAtRepositoryKey::of(
                "maven",
                ModuleComponentArtifactIdentifier::new(
                    ModuleComponentIdentifier::new("org.example", "lib", "1.0"),
                    IvyArtifactName::new("lib", "jar")
                        .with_extension(None)
                        .with_classifier(Some("sources".to_string())),
                ),
            )
        );
    }

    #[test]
    fn key_from_file_name() {
        let key = artifact_key(&args(None, Some("lib-1.0.pom"))).unwrap();
        assert!(key.to_string().contains("lib-1.0.pom"));
        assert!(artifact_key(&args(None, Some(""))).is_err());
    }

    #[test]
    fn bad_module_is_invalid_identifier() {
        let mut bad = args(Some("lib:jar"), None);
        bad.module = "org.example:lib".to_string();
        assert!(matches!(
            artifact_key(&bad),
            Err(ArtcacheError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn descriptor_hash_sources() {
        assert_eq!(
            descriptor_hash(&DescriptorArgs::default()).unwrap(),
            DescriptorHash::zero()
        );

        let from_hex = descriptor_hash(&DescriptorArgs {
            descriptor: None,
            descriptor_hash: Some("0x0080".to_string()),
        })
        .unwrap();
        assert_eq!(from_hex, DescriptorHash::from(128i64));

        assert!(descriptor_hash(&DescriptorArgs {
            descriptor: None,
            descriptor_hash: Some("zz".to_string()),
        })
        .is_err());

        let missing = descriptor_hash(&DescriptorArgs {
            descriptor: Some(PathBuf::from("/nonexistent/descriptor.pom")),
            descriptor_hash: None,
        });
        assert!(missing.is_err());
    }
}
