//! # strata_ecs
//!
//! Archetype-based entity/component storage with relations and deferred
//! structural mutation.
//!
//! ## Design Goals
//! - Archetype-based storage: entities are grouped by the exact set of
//!   component types they carry, stored in dense parallel columns
//! - Generational identities: stale handles are detected, indices recycled
//! - Relations: the same component type can be attached to one entity
//!   multiple times under different target entities
//! - Structural-change safety: while the registry is locked, membership
//!   mutations are queued and replayed in order on the outermost unlock
//!
//! The crate is a pure in-process data structure library: no file format,
//! wire protocol, or CLI surface.

#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::registry::Archetypes;

pub use engine::entity::{Entity, Identity, Meta};

pub use engine::component::{component_id_of, component_name, StorageType};

pub use engine::archetype::Archetype;

pub use engine::storage::{Column, TypeErasedColumn};

pub use engine::query::Mask;

pub use engine::commands::DeferredOp;

pub use engine::error::{
    ColumnError, ComponentNotFoundError, DuplicateComponentError, EcsError, EcsResult,
    UnknownEntityError,
};

pub use engine::types::{ArchetypeId, BitSet, ComponentId, EntityId, TypeIndex};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used types.
///
/// Import with:
/// ```rust
/// use strata_ecs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Archetypes,
        EcsError,
        EcsResult,
        Entity,
        Identity,
        Mask,
        StorageType,
    };
}
