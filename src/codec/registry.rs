//! Tag-dispatched serializers for artifact identifiers
//!
//! Each identifier kind is registered under an explicit tag. The writer looks
//! the kind up by the concrete type of the identifier and writes the tag
//! before the payload; the reader reads the tag and picks the serializer.
//! Tags are part of the on-disk format: new kinds take new tags, existing
//! tags are never reassigned.

use super::{CodecError, CodecResult, Decoder, Encoder, Serializer};
use crate::identifier::{
    ArtifactIdentifier, ModuleComponentArtifactIdentifier,
    ModuleComponentArtifactIdentifierSerializer, ModuleComponentFileArtifactIdentifier,
    ModuleComponentFileArtifactIdentifierSerializer,
};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Tag of [`ModuleComponentArtifactIdentifier`]
pub const MODULE_COMPONENT_ARTIFACT_TAG: u32 = 0;

/// Tag of [`ModuleComponentFileArtifactIdentifier`]
pub const MODULE_COMPONENT_FILE_ARTIFACT_TAG: u32 = 1;

trait ErasedSerializer: Send + Sync {
    fn write(&self, encoder: &mut dyn Encoder, id: &dyn ArtifactIdentifier) -> CodecResult<()>;

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<Arc<dyn ArtifactIdentifier>>;
}

struct Typed<T, S> {
    serializer: S,
    _kind: PhantomData<fn() -> T>,
}

impl<T, S> ErasedSerializer for Typed<T, S>
where
    T: ArtifactIdentifier + Eq + std::hash::Hash,
    S: Serializer<T>,
{
    fn write(&self, encoder: &mut dyn Encoder, id: &dyn ArtifactIdentifier) -> CodecResult<()> {
        let id = id
            .as_any()
            .downcast_ref::<T>()
            .ok_or(CodecError::UnregisteredIdentifier(id.kind_name()))?;
        self.serializer.write(encoder, id)
    }

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<Arc<dyn ArtifactIdentifier>> {
        Ok(Arc::new(self.serializer.read(decoder)?))
    }
}

struct Registration {
    tag: u32,
    kind_name: &'static str,
    serializer: Arc<dyn ErasedSerializer>,
}

/// Builder collecting identifier kinds before any encoding happens
#[derive(Default)]
pub struct IdentifierRegistryBuilder {
    by_kind: HashMap<TypeId, Registration>,
    by_tag: HashMap<u32, Arc<dyn ErasedSerializer>>,
}

impl IdentifierRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register identifier kind `T` under `tag`
    ///
    /// Fails when the tag or the kind is already taken.
    pub fn register<T, S>(self, tag: u32, serializer: S) -> CodecResult<Self>
    where
        T: ArtifactIdentifier + Eq + std::hash::Hash,
        S: Serializer<T> + 'static,
    {
        if self.by_tag.contains_key(&tag) {
            return Err(CodecError::DuplicateTag(tag));
        }
        if self.by_kind.contains_key(&TypeId::of::<T>()) {
            return Err(CodecError::DuplicateKind(std::any::type_name::<T>()));
        }
        Ok(self.insert::<T, S>(tag, serializer))
    }

    fn insert<T, S>(mut self, tag: u32, serializer: S) -> Self
    where
        T: ArtifactIdentifier + Eq + std::hash::Hash,
        S: Serializer<T> + 'static,
    {
        let serializer: Arc<dyn ErasedSerializer> = Arc::new(Typed {
            serializer,
            _kind: PhantomData,
        });
        self.by_tag.insert(tag, Arc::clone(&serializer));
        self.by_kind.insert(
            TypeId::of::<T>(),
            Registration {
                tag,
                kind_name: std::any::type_name::<T>(),
                serializer,
            },
        );
        self
    }

    pub fn build(self) -> IdentifierRegistry {
        IdentifierRegistry {
            by_kind: self.by_kind,
            by_tag: self.by_tag,
        }
    }
}

/// Serializer for `Arc<dyn ArtifactIdentifier>` covering every registered kind
pub struct IdentifierRegistry {
    by_kind: HashMap<TypeId, Registration>,
    by_tag: HashMap<u32, Arc<dyn ErasedSerializer>>,
}

impl IdentifierRegistry {
    pub fn builder() -> IdentifierRegistryBuilder {
        IdentifierRegistryBuilder::new()
    }

    /// Registry with the built-in module component kinds
    pub fn with_defaults() -> Self {
        Self::defaults_builder().build()
    }

    /// Builder pre-loaded with the built-in kinds, for adding more
    pub fn defaults_builder() -> IdentifierRegistryBuilder {
        IdentifierRegistryBuilder::new()
            .insert::<ModuleComponentArtifactIdentifier, _>(
                MODULE_COMPONENT_ARTIFACT_TAG,
                ModuleComponentArtifactIdentifierSerializer,
            )
            .insert::<ModuleComponentFileArtifactIdentifier, _>(
                MODULE_COMPONENT_FILE_ARTIFACT_TAG,
                ModuleComponentFileArtifactIdentifierSerializer,
            )
    }

    /// Tag assigned to the kind of `id`, if registered
    pub fn tag_of(&self, id: &dyn ArtifactIdentifier) -> Option<u32> {
        self.by_kind.get(&id.kind_id()).map(|r| r.tag)
    }

    /// Registered tags in ascending order
    pub fn tags(&self) -> Vec<u32> {
        let mut tags: Vec<u32> = self.by_tag.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for IdentifierRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for IdentifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<(u32, &str)> = self
            .by_kind
            .values()
            .map(|r| (r.tag, r.kind_name))
            .collect();
        kinds.sort_unstable();
        f.debug_struct("IdentifierRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

impl Serializer<Arc<dyn ArtifactIdentifier>> for IdentifierRegistry {
    fn write(
        &self,
        encoder: &mut dyn Encoder,
        value: &Arc<dyn ArtifactIdentifier>,
    ) -> CodecResult<()> {
        let registration = self
            .by_kind
            .get(&value.kind_id())
            .ok_or(CodecError::UnregisteredIdentifier(value.kind_name()))?;
        encoder.write_small_int(registration.tag)?;
        registration.serializer.write(encoder, value.as_ref())
    }

    fn read(&self, decoder: &mut dyn Decoder) -> CodecResult<Arc<dyn ArtifactIdentifier>> {
        let tag = decoder.read_small_int()?;
        let serializer = self.by_tag.get(&tag).ok_or(CodecError::UnknownTag(tag))?;
        serializer.read(decoder)
    }
}
