//! Wire encoding of cache keys and entries
//!
//! Key: repository id (string), then the artifact identifier as registry tag
//! plus payload.
//!
//! Entry, in order:
//!
//! 1. `is_missing` (boolean)
//! 2. `cached_at` (long)
//! 3. descriptor hash (binary, canonical two's-complement bytes)
//! 4. present: file path (string), then file last-modified (long)
//! 5. missing: location count (small int), then each location (string)

use super::entry::{ArtifactAtRepositoryKey, CachedArtifact};
use super::hash::DescriptorHash;
use crate::codec::{
    CodecError, CodecResult, Decoder, Encoder, IdentifierRegistry, Serializer,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Encodes [`ArtifactAtRepositoryKey`] through an identifier registry
#[derive(Debug, Clone)]
pub struct ArtifactAtRepositoryKeySerializer {
    identifiers: Arc<IdentifierRegistry>,
}

impl ArtifactAtRepositoryKeySerializer {
    pub fn new(identifiers: Arc<IdentifierRegistry>) -> Self {
        Self { identifiers }
    }
}

impl Default for ArtifactAtRepositoryKeySerializer {
    fn default() -> Self {
        Self::new(Arc::new(IdentifierRegistry::with_defaults()))
    }
}

impl Serializer<ArtifactAtRepositoryKey> for ArtifactAtRepositoryKeySerializer {
    fn write(&self, encoder: &mut dyn Encoder, value: &ArtifactAtRepositoryKey) -> CodecResult<()> {
        encoder.write_string(value.repository_id())?;
        self.identifiers.write(encoder, value.artifact_id())
    }

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<ArtifactAtRepositoryKey> {
        let repository_id = decoder.read_string()?;
        let artifact_id = self.identifiers.read(decoder)?;
        Ok(ArtifactAtRepositoryKey::new(repository_id, artifact_id))
    }
}

/// Encodes [`CachedArtifact`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedArtifactSerializer;

impl Serializer<CachedArtifact> for CachedArtifactSerializer {
    fn write(&self, encoder: &mut dyn Encoder, value: &CachedArtifact) -> CodecResult<()> {
        encoder.write_boolean(value.is_missing())?;
        encoder.write_long(value.cached_at())?;
        encoder.write_binary(value.descriptor_hash().to_signed_bytes_be())?;

        match value {
            CachedArtifact::Present {
                cached_file,
                cached_file_last_modified,
                ..
            } => {
                let path = cached_file
                    .to_str()
                    .ok_or_else(|| CodecError::NonUtf8Path(cached_file.clone()))?;
                encoder.write_string(path)?;
                encoder.write_long(*cached_file_last_modified)
            }
            CachedArtifact::Missing {
                attempted_locations,
                ..
            } => {
                let count = u32::try_from(attempted_locations.len())
                    .map_err(|_| CodecError::LengthOverflow(attempted_locations.len()))?;
                encoder.write_small_int(count)?;
                for location in attempted_locations {
                    encoder.write_string(location)?;
                }
                Ok(())
            }
        }
    }

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<CachedArtifact> {
        let is_missing = decoder.read_boolean()?;
        let cached_at = decoder.read_long()?;
        let descriptor_hash = DescriptorHash::from_signed_bytes_be(&decoder.read_binary()?)
            .ok_or(CodecError::EmptyDescriptorHash)?;

        if !is_missing {
            let cached_file = PathBuf::from(decoder.read_string()?);
            let cached_file_last_modified = decoder.read_long()?;
            Ok(CachedArtifact::present(
                cached_file,
                cached_at,
                descriptor_hash,
                cached_file_last_modified,
            ))
        } else {
            let count = decoder.read_small_int()? as usize;
            // Each location takes at least one byte; don't trust the count further.
            let capacity = decoder.remaining().map_or(0, |r| count.min(r));
            let mut attempted_locations = Vec::with_capacity(capacity);
            for _ in 0..count {
                attempted_locations.push(decoder.read_string()?);
            }
            Ok(CachedArtifact::missing(
                attempted_locations,
                cached_at,
                descriptor_hash,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_bytes, to_bytes};
    use crate::identifier::{
        IvyArtifactName, ModuleComponentArtifactIdentifier, ModuleComponentFileArtifactIdentifier,
        ModuleComponentIdentifier,
    };
    use proptest::prelude::*;

    fn roundtrip(entry: &CachedArtifact) -> CachedArtifact {
        let bytes = to_bytes(&CachedArtifactSerializer, entry).unwrap();
        from_bytes(&CachedArtifactSerializer, &bytes).unwrap()
    }

    fn component() -> ModuleComponentIdentifier {
        ModuleComponentIdentifier::new("org.example", "lib", "1.0")
    }

    #[test]
    fn present_layout() {
        let entry = CachedArtifact::present("/a", 2, DescriptorHash::from(128i64), 3);
        let bytes = to_bytes(&CachedArtifactSerializer, &entry).unwrap();
        let expected = [
            vec![0],                      // present
            vec![0, 0, 0, 0, 0, 0, 0, 2], // cached_at
            vec![2, 0x00, 0x80],          // hash
            vec![2, b'/', b'a'],          // path
            vec![0, 0, 0, 0, 0, 0, 0, 3], // last modified
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn missing_layout() {
        let entry = CachedArtifact::missing(
            vec!["r1".to_string(), "r2".to_string()],
            1,
            DescriptorHash::from(-1i64),
        );
        let bytes = to_bytes(&CachedArtifactSerializer, &entry).unwrap();
        let expected = [
            vec![1],
            vec![0, 0, 0, 0, 0, 0, 0, 1],
            vec![1, 0xff],
            vec![2],
            vec![2, b'r', b'1'],
            vec![2, b'r', b'2'],
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn descriptor_hash_edge_values_roundtrip() {
        let hashes = [
            DescriptorHash::zero(),
            DescriptorHash::from(1i64),
            DescriptorHash::from(i128::MAX),
            DescriptorHash::from_unsigned_digest(&[0xff; 32]),
            DescriptorHash::from(-42i64),
            DescriptorHash::from(i128::MIN),
        ];
        for hash in hashes {
            let present = CachedArtifact::present("/cache/a.jar", 7, hash.clone(), 8);
            let decoded = roundtrip(&present);
            assert_eq!(decoded, present);
            assert_eq!(
                decoded.descriptor_hash().to_signed_bytes_be(),
                hash.to_signed_bytes_be()
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/cache/lib-\xff.jar"));
        let entry = CachedArtifact::present(path, 1, DescriptorHash::zero(), 2);
        assert!(matches!(
            to_bytes(&CachedArtifactSerializer, &entry),
            Err(CodecError::NonUtf8Path(_))
        ));
    }

    #[test]
    fn empty_locations_roundtrip() {
        let entry = CachedArtifact::missing(vec![], 0, DescriptorHash::zero());
        assert_eq!(roundtrip(&entry), entry);
    }

    #[test]
    fn empty_hash_is_rejected() {
        let mut bytes = vec![1];
        bytes.extend_from_slice(&0i64.to_be_bytes());
        bytes.extend_from_slice(&[0, 0]);
        let result: CodecResult<CachedArtifact> = from_bytes(&CachedArtifactSerializer, &bytes);
        assert!(matches!(result, Err(CodecError::EmptyDescriptorHash)));
    }

    #[test]
    fn truncated_entry_is_rejected() {
        let entry = CachedArtifact::present("/cache/a.jar", 7, DescriptorHash::from(9i64), 8);
        let bytes = to_bytes(&CachedArtifactSerializer, &entry).unwrap();
        for len in 0..bytes.len() {
            let result: CodecResult<CachedArtifact> =
                from_bytes(&CachedArtifactSerializer, &bytes[..len]);
            assert!(result.is_err(), "prefix of {} bytes decoded", len);
        }
    }

    #[test]
    fn key_kinds_encode_differently() {
        let serializer = ArtifactAtRepositoryKeySerializer::default();
        let artifact = ArtifactAtRepositoryKey::of(
            "maven",
            ModuleComponentArtifactIdentifier::new(component(), IvyArtifactName::new("lib", "jar")),
        );
        let file = ArtifactAtRepositoryKey::of(
            "maven",
            ModuleComponentFileArtifactIdentifier::new(component(), "lib-1.0.jar"),
        );
        assert_ne!(
            to_bytes(&serializer, &artifact).unwrap(),
            to_bytes(&serializer, &file).unwrap()
        );

        for key in [artifact, file] {
            let bytes = to_bytes(&serializer, &key).unwrap();
            let decoded: ArtifactAtRepositoryKey = from_bytes(&serializer, &bytes).unwrap();
            assert_eq!(decoded, key);
        }
    }

    fn text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9._/-]{0,12}"
    }

    fn component_strategy() -> impl Strategy<Value = ModuleComponentIdentifier> {
        (text(), text(), text()).prop_map(|(g, m, v)| ModuleComponentIdentifier::new(g, m, v))
    }

    fn hash_strategy() -> impl Strategy<Value = DescriptorHash> {
        proptest::collection::vec(any::<u8>(), 1..24)
            .prop_map(|b| DescriptorHash::from_signed_bytes_be(&b).unwrap())
    }

    fn key_strategy() -> impl Strategy<Value = ArtifactAtRepositoryKey> {
        let artifact = (
            component_strategy(),
            text(),
            text(),
            proptest::option::of(text()),
            proptest::option::of(text()),
        )
            .prop_map(|(c, name, kind, ext, classifier)| {
                Arc::new(ModuleComponentArtifactIdentifier::new(
                    c,
                    IvyArtifactName::new(name, kind)
                        .with_extension(ext)
                        .with_classifier(classifier),
                )) as Arc<dyn crate::identifier::ArtifactIdentifier>
            });
        let file = (component_strategy(), text()).prop_map(|(c, file_name)| {
            Arc::new(ModuleComponentFileArtifactIdentifier::new(c, file_name))
                as Arc<dyn crate::identifier::ArtifactIdentifier>
        });
        (text(), prop_oneof![artifact, file])
            .prop_map(|(repo, id)| ArtifactAtRepositoryKey::new(repo, id))
    }

    fn entry_strategy() -> impl Strategy<Value = CachedArtifact> {
        prop_oneof![
            (text(), any::<i64>(), hash_strategy(), any::<i64>())
                .prop_map(|(f, at, h, lm)| CachedArtifact::present(f, at, h, lm)),
            (proptest::collection::vec(text(), 0..6), any::<i64>(), hash_strategy())
                .prop_map(|(locs, at, h)| CachedArtifact::missing(locs, at, h)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Decoding an encoded entry gives back the same entry.
        #[test]
        fn prop_entry_roundtrip(entry in entry_strategy()) {
            prop_assert_eq!(roundtrip(&entry), entry);
        }

        /// Key encoding is injective: equal keys, equal bytes; different keys, different bytes.
        #[test]
        fn prop_key_encoding_is_injective(k1 in key_strategy(), k2 in key_strategy()) {
            let serializer = ArtifactAtRepositoryKeySerializer::default();
            let b1 = to_bytes(&serializer, &k1).unwrap();
            let b2 = to_bytes(&serializer, &k2).unwrap();
            if k1 == k2 {
                prop_assert_eq!(b1, b2);
            } else {
                prop_assert_ne!(b1, b2);
            }
        }
    }
}
