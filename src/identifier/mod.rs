//! Artifact identifiers
//!
//! The set of identifier kinds is open: any type implementing
//! [`ArtifactIdentifier`] can be used in a cache key, provided a serializer
//! for it is registered with the [`IdentifierRegistry`](crate::codec::IdentifierRegistry).
//!
//! Keys hold identifiers as `Arc<dyn ArtifactIdentifier>`. Equality and
//! hashing on the trait object defer to the concrete type, and identifiers of
//! different kinds never compare equal.

pub mod module;

pub use module::{
    IvyArtifactName, ModuleComponentArtifactIdentifier, ModuleComponentArtifactIdentifierSerializer,
    ModuleComponentFileArtifactIdentifier, ModuleComponentFileArtifactIdentifierSerializer,
    ModuleComponentIdentifier,
};

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies one artifact of one component
///
/// `Display` renders the human-readable name used in diagnostics.
pub trait ArtifactIdentifier: DynIdentifier + fmt::Debug + fmt::Display + Send + Sync {}

/// Type-erased equality, hashing and downcasting for identifiers
///
/// Implemented automatically for every `ArtifactIdentifier + Eq + Hash`.
pub trait DynIdentifier: Any {
    fn as_any(&self) -> &dyn Any;

    /// Rust type name of the concrete kind
    fn kind_name(&self) -> &'static str;

    fn kind_id(&self) -> TypeId;

    fn eq_identifier(&self, other: &dyn ArtifactIdentifier) -> bool;

    fn hash_identifier(&self, state: &mut dyn Hasher);
}

impl<T> DynIdentifier for T
where
    T: ArtifactIdentifier + Eq + Hash,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn kind_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn kind_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn eq_identifier(&self, other: &dyn ArtifactIdentifier) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn hash_identifier(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        Hash::hash(self, &mut state);
    }
}

impl PartialEq for dyn ArtifactIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.eq_identifier(other)
    }
}

impl Eq for dyn ArtifactIdentifier {}

impl Hash for dyn ArtifactIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_identifier(state)
    }
}
