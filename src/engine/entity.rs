//! Generational entity identities and the per-slot meta record.

use std::fmt;

use crate::engine::types::{
    ArchetypeId, EntityId, GenerationId, IndexId, INDEX_BITS, INDEX_MASK,
};

/// A generation-stamped index uniquely naming an entity slot over its reuse
/// history.
///
/// An identity is "alive" iff the meta table entry at its index currently
/// carries the same generation; a despawned identity becomes stale the moment
/// its slot is released and never matches again.
///
/// Two sentinel values exist as constants:
///
/// - [`Identity::NONE`] — invalid/absent; the target of a plain (non-relation)
///   storage type.
/// - [`Identity::ANY`] — wildcard, accepted only while building query masks.
///
/// Both sentinels carry an out-of-range index, so neither can ever be alive
/// and every operation that requires a concrete live entity rejects them
/// through the ordinary liveness check.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(EntityId);

#[inline]
const fn make_id(index: IndexId, generation: GenerationId) -> EntityId {
    ((generation as EntityId) << INDEX_BITS) | (index as EntityId)
}

impl Identity {
    /// The invalid/absent identity.
    pub const NONE: Identity = Identity(make_id(IndexId::MAX, 0));

    /// The wildcard identity, valid only in mask construction.
    pub const ANY: Identity = Identity(make_id(IndexId::MAX, GenerationId::MAX));

    /// Builds an identity from its index and generation.
    #[inline]
    pub const fn new(index: IndexId, generation: GenerationId) -> Self {
        Identity(make_id(index, generation))
    }

    /// Slot index within the meta table.
    #[inline]
    pub const fn index(self) -> IndexId {
        (self.0 & INDEX_MASK) as IndexId
    }

    /// Generation counter stamped into this identity.
    #[inline]
    pub const fn generation(self) -> GenerationId {
        (self.0 >> INDEX_BITS) as GenerationId
    }

    /// Returns `true` if this is the [`Identity::NONE`] sentinel.
    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this is the [`Identity::ANY`] sentinel.
    #[inline]
    pub fn is_any(self) -> bool {
        self == Self::ANY
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else if self.is_any() {
            f.write_str("any")
        } else {
            write!(f, "{}:{}", self.index(), self.generation())
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({self})")
    }
}

/// Handle to a spawned entity, wrapping its [`Identity`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Entity(Identity);

impl Entity {
    /// The entity handle for [`Identity::NONE`].
    pub const NONE: Entity = Entity(Identity::NONE);

    /// The entity handle for [`Identity::ANY`].
    pub const ANY: Entity = Entity(Identity::ANY);

    /// Wraps an identity in an entity handle.
    #[inline]
    pub const fn new(identity: Identity) -> Self {
        Entity(identity)
    }

    /// The underlying identity.
    #[inline]
    pub const fn identity(self) -> Identity {
        self.0
    }

    /// Returns `true` if this handle wraps [`Identity::NONE`].
    #[inline]
    pub fn is_none(self) -> bool {
        self.0.is_none()
    }

    /// Returns `true` if this handle wraps [`Identity::ANY`].
    #[inline]
    pub fn is_any(self) -> bool {
        self.0.is_any()
    }
}

/// Per-slot record in the entity meta table.
///
/// One entry exists per allocated index slot, including recycled ones; a
/// despawned slot holds [`Identity::NONE`] until the index is reused.
#[derive(Clone, Copy, Debug)]
pub struct Meta {
    /// Identity currently occupying this slot, or [`Identity::NONE`].
    pub identity: Identity,
    /// Archetype the entity currently resides in.
    pub archetype: ArchetypeId,
    /// Row within that archetype's entity list and columns.
    pub row: usize,
}

impl Default for Meta {
    fn default() -> Self {
        Self { identity: Identity::NONE, archetype: 0, row: 0 }
    }
}
