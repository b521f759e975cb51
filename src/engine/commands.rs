//! Deferred structural operations.
//!
//! While the registry is locked, structural mutations are recorded as
//! [`DeferredOp`] values instead of being applied, then replayed in
//! submission order when the outermost unlock executes. This keeps code
//! iterating over an archetype's entity and column arrays from observing
//! membership changes mid-iteration.
//!
//! ## Design
//! - Operations are plain data describing *what* change should occur, not
//!   *how*; the registry replays them by pattern dispatch.
//! - Spawning is never deferred: a spawn under lock still allocates a live
//!   identity in the root archetype immediately.
//!
//! ## Invariants
//! - Operations must be replayed in the order they were recorded.
//! - An operation that has become invalid by replay time is skipped, never
//!   partially applied.

use std::any::Any;

use crate::engine::component::StorageType;
use crate::engine::entity::Identity;

/// A recorded structural mutation awaiting replay.
pub enum DeferredOp {
    /// Despawns an entity, releasing its row and recycling its index.
    Despawn {
        /// Entity to remove.
        identity: Identity,
    },

    /// Attaches a component, moving the entity to the archetype that
    /// includes the storage type.
    Add {
        /// Storage type (component and optional relation target) to attach.
        component: StorageType,
        /// Target entity receiving the component.
        identity: Identity,
        /// Component value to insert; its dynamic type must match the
        /// storage type's registered component type.
        value: Box<dyn Any>,
    },

    /// Detaches a component, moving the entity to the archetype that
    /// excludes the storage type. The removed value is dropped.
    Remove {
        /// Storage type to detach.
        component: StorageType,
        /// Target entity losing the component.
        identity: Identity,
    },
}
