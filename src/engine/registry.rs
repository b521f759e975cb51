//! The `Archetypes` registry: entity lifecycle, archetype transitions, and
//! deferred structural mutation.
//!
//! This module defines the central orchestration layer of the engine,
//! responsible for:
//!
//! * owning the entity meta table and the free list of recyclable indices,
//! * owning all archetypes and the content-addressed index over their type
//!   sets,
//! * coordinating entity movement between archetypes as components are
//!   added and removed,
//! * deferring structural mutation while the registry is locked.
//!
//! ## Concurrency model
//!
//! The registry is single-threaded: all operations are synchronous and run
//! to completion on the calling thread. The only re-entrancy concern is
//! structural mutation during iteration, handled entirely by the
//! [`lock`](Archetypes::lock)/[`unlock`](Archetypes::unlock) mechanism:
//! while the lock depth is non-zero, every membership-changing call is
//! appended to a command buffer and replayed in submission order when the
//! depth returns to zero. Reads (`has_component`, `get_component`,
//! `is_alive`) keep reflecting pre-deferral state until then.
//!
//! ## Invariants
//!
//! * A meta entry's `(archetype, row)` always points at the entity's actual
//!   storage; swap-removes repair the displaced entity's entry in the same
//!   operation.
//! * The archetype index maps each canonical sorted type set to exactly one
//!   archetype; archetypes are created lazily and never deleted, only
//!   emptied.
//! * After any failed operation, no partial mutation is observable.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::engine::archetype::Archetype;
use crate::engine::commands::DeferredOp;
use crate::engine::component::StorageType;
use crate::engine::entity::{Entity, Identity, Meta};
use crate::engine::error::{
    ColumnError, ComponentNotFoundError, DuplicateComponentError, EcsResult, UnknownEntityError,
};
use crate::engine::query::Mask;
use crate::engine::types::{ArchetypeId, INITIAL_META_CAP};

/// The archetype-based entity/component registry.
///
/// Owns all archetype and meta-table memory; callers hold only
/// index-based [`Identity`] handles or references scoped to a single
/// unlocked call.
pub struct Archetypes {
    meta: Vec<Meta>,
    head: u32,
    unused_ids: Vec<Identity>,
    archetypes: Vec<Archetype>,
    by_types: HashMap<Box<[StorageType]>, ArchetypeId>,
    lock_count: u32,
    deferred: Vec<DeferredOp>,
    alive_count: usize,
}

impl Default for Archetypes {
    fn default() -> Self {
        Self::new()
    }
}

impl Archetypes {
    /// Identifier of the root (empty type set) archetype.
    ///
    /// The root exists from construction, holds every freshly spawned
    /// entity, and never disappears.
    pub const ROOT: ArchetypeId = 0;

    /// Creates a registry with an empty root archetype and a meta table of
    /// [`INITIAL_META_CAP`] slots.
    pub fn new() -> Self {
        let mut by_types = HashMap::new();
        by_types.insert(Box::<[StorageType]>::default(), Self::ROOT);

        Self {
            meta: vec![Meta::default(); INITIAL_META_CAP],
            head: 0,
            unused_ids: Vec::new(),
            archetypes: vec![Archetype::new(Self::ROOT, Box::default())],
            by_types,
            lock_count: 0,
            deferred: Vec::new(),
            alive_count: 0,
        }
    }

    /// Spawns a new entity into the root archetype and returns its handle.
    ///
    /// Recycled indices are reused with their generation already
    /// incremented; otherwise a fresh slot is taken, doubling the meta
    /// table when the head passes the end. Growth is not an error path.
    ///
    /// Spawning is never deferred: under a lock it still takes effect
    /// immediately, so the returned handle is live.
    pub fn spawn(&mut self) -> Entity {
        let identity = match self.unused_ids.pop() {
            Some(recycled) => recycled,
            None => {
                if self.head as usize == self.meta.len() {
                    let grown = self.meta.len() * 2;
                    self.meta.resize(grown, Meta::default());
                    debug!("meta table grown to {grown} slots");
                }
                let index = self.head;
                self.head += 1;
                Identity::new(index, 0)
            }
        };

        let row = self.archetypes[Self::ROOT as usize].push_entity(identity);
        self.meta[identity.index() as usize] = Meta { identity, archetype: Self::ROOT, row };
        self.alive_count += 1;
        Entity::new(identity)
    }

    /// Despawns an entity, freeing its row and recycling its index.
    ///
    /// ## Errors
    /// [`UnknownEntityError`] if the identity is stale or out of range,
    /// including an identity that was already despawned.
    ///
    /// While locked, the removal is validated immediately but applied only
    /// on the outermost unlock; the entity stays alive until then.
    pub fn despawn(&mut self, identity: Identity) -> EcsResult<()> {
        self.ensure_alive(identity)?;

        if self.lock_count > 0 {
            self.deferred.push(DeferredOp::Despawn { identity });
            return Ok(());
        }

        self.apply_despawn(identity)
    }

    /// Returns `true` if the identity names a live entity: its index is in
    /// range and the meta table's generation matches.
    #[inline]
    pub fn is_alive(&self, identity: Identity) -> bool {
        let index = identity.index() as usize;
        index < self.meta.len() && self.meta[index].identity == identity
    }

    /// Attaches a component value to an entity.
    ///
    /// The entity moves to the archetype whose type set is its current set
    /// plus `component`; the destination archetype is created lazily on
    /// first use. The value's dynamic type must match the storage type's
    /// registered component type.
    ///
    /// ## Errors
    /// - [`UnknownEntityError`] if the identity is not alive.
    /// - [`DuplicateComponentError`] if the exact component-and-target pair
    ///   is already attached.
    /// - [`ColumnError::TypeMismatch`] if the boxed value is of the wrong
    ///   type; nothing is mutated.
    ///
    /// While locked, the operation is validated against current state and
    /// queued for replay.
    pub fn add_component(
        &mut self,
        component: StorageType,
        identity: Identity,
        value: Box<dyn Any>,
    ) -> EcsResult<()> {
        self.ensure_alive(identity)?;

        let meta = self.meta[identity.index() as usize];
        if self.archetypes[meta.archetype as usize].contains(component) {
            return Err(DuplicateComponentError {
                identity,
                component: component.name(),
                target: component.target(),
            }
            .into());
        }

        if self.lock_count > 0 {
            self.deferred.push(DeferredOp::Add { component, identity, value });
            return Ok(());
        }

        self.apply_add(component, identity, value)
    }

    /// Detaches a component from an entity, dropping the stored value.
    ///
    /// The entity moves to the archetype whose type set is its current set
    /// minus `component`; removing the last component moves it back to the
    /// root archetype and the entity stays alive.
    ///
    /// ## Errors
    /// - [`UnknownEntityError`] if the identity is not alive.
    /// - [`ComponentNotFoundError`] if the component-and-target pair is not
    ///   attached.
    ///
    /// While locked, the operation is validated against current state and
    /// queued for replay.
    pub fn remove_component(&mut self, component: StorageType, identity: Identity) -> EcsResult<()> {
        self.ensure_alive(identity)?;

        let meta = self.meta[identity.index() as usize];
        if !self.archetypes[meta.archetype as usize].contains(component) {
            return Err(ComponentNotFoundError {
                identity,
                component: component.name(),
                target: component.target(),
            }
            .into());
        }

        if self.lock_count > 0 {
            self.deferred.push(DeferredOp::Remove { component, identity });
            return Ok(());
        }

        self.apply_remove(component, identity)
    }

    /// Borrows the stored component value for an entity.
    ///
    /// ## Errors
    /// - [`UnknownEntityError`] if the identity is not alive.
    /// - [`ComponentNotFoundError`] if the component-and-target pair is not
    ///   attached.
    /// - [`ColumnError::TypeMismatch`] if `T` is not the component's stored
    ///   type.
    pub fn get_component<T: 'static>(
        &self,
        component: StorageType,
        identity: Identity,
    ) -> EcsResult<&T> {
        self.ensure_alive(identity)?;

        let meta = self.meta[identity.index() as usize];
        let archetype = &self.archetypes[meta.archetype as usize];
        let Some(column) = archetype.column(component) else {
            return Err(ComponentNotFoundError {
                identity,
                component: component.name(),
                target: component.target(),
            }
            .into());
        };

        let value = column
            .row_ref(meta.row)
            .ok_or(ColumnError::RowOutOfBounds { row: meta.row, length: column.length() })?;

        match value.downcast_ref::<T>() {
            Some(value) => Ok(value),
            None => Err(ColumnError::TypeMismatch {
                expected: column.element_type_id(),
                expected_name: column.element_type_name(),
                actual: TypeId::of::<T>(),
            }
            .into()),
        }
    }

    /// Mutably borrows the stored component value for an entity.
    ///
    /// Same failure modes as [`get_component`](Self::get_component).
    pub fn get_component_mut<T: 'static>(
        &mut self,
        component: StorageType,
        identity: Identity,
    ) -> EcsResult<&mut T> {
        self.ensure_alive(identity)?;

        let meta = self.meta[identity.index() as usize];
        let archetype = &mut self.archetypes[meta.archetype as usize];
        let Some(column) = archetype.column_mut(component) else {
            return Err(ComponentNotFoundError {
                identity,
                component: component.name(),
                target: component.target(),
            }
            .into());
        };

        let length = column.length();
        let element_type = column.element_type_id();
        let element_name = column.element_type_name();

        let value = column
            .row_mut(meta.row)
            .ok_or(ColumnError::RowOutOfBounds { row: meta.row, length })?;

        match value.downcast_mut::<T>() {
            Some(value) => Ok(value),
            None => Err(ColumnError::TypeMismatch {
                expected: element_type,
                expected_name: element_name,
                actual: TypeId::of::<T>(),
            }
            .into()),
        }
    }

    /// Returns `true` if the live entity carries the exact
    /// component-and-target pair. Never fails; a dead identity is `false`.
    pub fn has_component(&self, component: StorageType, identity: Identity) -> bool {
        if !self.is_alive(identity) {
            return false;
        }
        let meta = self.meta[identity.index() as usize];
        self.archetypes[meta.archetype as usize].contains(component)
    }

    /// Increments the lock depth. Re-entrant.
    ///
    /// While the depth is non-zero, structural calls (`add_component`,
    /// `remove_component`, `despawn`) are queued instead of applied, so
    /// iteration over archetype storage cannot observe membership changes.
    pub fn lock(&mut self) {
        self.lock_count += 1;
    }

    /// Decrements the lock depth; the transition to zero replays every
    /// queued operation in submission order and clears the queue.
    ///
    /// Unlocking an already-unlocked registry is a logged no-op.
    pub fn unlock(&mut self) {
        if self.lock_count == 0 {
            warn!("unlock called without a matching lock");
            return;
        }

        self.lock_count -= 1;
        if self.lock_count == 0 {
            self.apply_deferred();
        }
    }

    /// Number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.alive_count
    }

    /// Number of archetypes created so far, including the root.
    ///
    /// Stable across add/remove order permutations of the same type sets,
    /// since archetype lookup is content-addressed.
    #[inline]
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Borrows an archetype by id.
    pub fn archetype(&self, id: ArchetypeId) -> Option<&Archetype> {
        self.archetypes.get(id as usize)
    }

    /// Returns the ids of all archetypes matching a mask.
    pub fn matching(&self, mask: &Mask) -> Vec<ArchetypeId> {
        self.archetypes
            .iter()
            .filter(|archetype| mask.matches(archetype))
            .map(|archetype| archetype.id())
            .collect()
    }

    #[inline]
    fn ensure_alive(&self, identity: Identity) -> EcsResult<()> {
        if self.is_alive(identity) {
            Ok(())
        } else {
            Err(UnknownEntityError { identity }.into())
        }
    }

    /// Retrieves the archetype for a canonical type set, creating it lazily.
    fn archetype_for(&mut self, types: Box<[StorageType]>) -> ArchetypeId {
        if let Some(&id) = self.by_types.get(&types) {
            return id;
        }

        let id = self.archetypes.len() as ArchetypeId;
        debug!("creating archetype {id} with {} storage type(s)", types.len());
        self.by_types.insert(types.clone(), id);
        self.archetypes.push(Archetype::new(id, types));
        id
    }

    /// Returns mutable references to two distinct archetypes.
    ///
    /// ## Panics
    /// Panics if `a == b`; transition source and destination always differ
    /// because their type sets differ.
    fn archetype_pair_mut(
        archetypes: &mut [Archetype],
        a: ArchetypeId,
        b: ArchetypeId,
    ) -> (&mut Archetype, &mut Archetype) {
        assert!(a != b, "source and destination archetype must differ");

        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = archetypes.split_at_mut(high as usize);

        let left = &mut head[low as usize];
        let right = &mut tail[0];

        if a < b { (left, right) } else { (right, left) }
    }

    fn apply_despawn(&mut self, identity: Identity) -> EcsResult<()> {
        self.ensure_alive(identity)?;

        let meta = self.meta[identity.index() as usize];
        let swapped = self.archetypes[meta.archetype as usize].swap_remove_row(meta.row)?;
        if let Some(moved) = swapped {
            self.meta[moved.index() as usize].row = meta.row;
        }

        self.meta[identity.index() as usize] = Meta::default();
        self.unused_ids
            .push(Identity::new(identity.index(), identity.generation().wrapping_add(1)));
        self.alive_count -= 1;

        trace!("despawned entity {identity}");
        Ok(())
    }

    fn apply_add(
        &mut self,
        component: StorageType,
        identity: Identity,
        value: Box<dyn Any>,
    ) -> EcsResult<()> {
        self.ensure_alive(identity)?;

        let meta = self.meta[identity.index() as usize];
        let source_id = meta.archetype;

        let mut types = self.archetypes[source_id as usize].types().to_vec();
        let slot = match types.binary_search(&component) {
            Err(slot) => slot,
            Ok(_) => {
                return Err(DuplicateComponentError {
                    identity,
                    component: component.name(),
                    target: component.target(),
                }
                .into())
            }
        };
        types.insert(slot, component);

        let destination_id = self.archetype_for(types.into_boxed_slice());
        let (source, destination) =
            Self::archetype_pair_mut(&mut self.archetypes, source_id, destination_id);

        let (destination_row, swapped) =
            source.move_row_to(destination, meta.row, Some((component, value)))?;

        if let Some(moved) = swapped {
            self.meta[moved.index() as usize].row = meta.row;
        }
        let entry = &mut self.meta[identity.index() as usize];
        entry.archetype = destination_id;
        entry.row = destination_row;

        trace!("entity {identity} moved to archetype {destination_id}");
        Ok(())
    }

    fn apply_remove(&mut self, component: StorageType, identity: Identity) -> EcsResult<()> {
        self.ensure_alive(identity)?;

        let meta = self.meta[identity.index() as usize];
        let source_id = meta.archetype;

        let mut types = self.archetypes[source_id as usize].types().to_vec();
        let slot = match types.binary_search(&component) {
            Ok(slot) => slot,
            Err(_) => {
                return Err(ComponentNotFoundError {
                    identity,
                    component: component.name(),
                    target: component.target(),
                }
                .into())
            }
        };
        types.remove(slot);

        let destination_id = self.archetype_for(types.into_boxed_slice());
        let (source, destination) =
            Self::archetype_pair_mut(&mut self.archetypes, source_id, destination_id);

        let (destination_row, swapped) = source.move_row_to(destination, meta.row, None)?;

        if let Some(moved) = swapped {
            self.meta[moved.index() as usize].row = meta.row;
        }
        let entry = &mut self.meta[identity.index() as usize];
        entry.archetype = destination_id;
        entry.row = destination_row;

        trace!("entity {identity} moved to archetype {destination_id}");
        Ok(())
    }

    /// Replays the deferred queue in submission order.
    ///
    /// Operations were validated when queued; one that has been invalidated
    /// by an earlier operation under the same lock (a duplicate add, a
    /// despawned target) is skipped with a warning, leaving registry
    /// invariants intact.
    fn apply_deferred(&mut self) {
        if self.deferred.is_empty() {
            return;
        }

        let operations = std::mem::take(&mut self.deferred);
        trace!("replaying {} deferred operation(s)", operations.len());

        for operation in operations {
            let result = match operation {
                DeferredOp::Despawn { identity } => self.apply_despawn(identity),
                DeferredOp::Add { component, identity, value } => {
                    self.apply_add(component, identity, value)
                }
                DeferredOp::Remove { component, identity } => {
                    self.apply_remove(component, identity)
                }
            };

            if let Err(error) = result {
                warn!("skipping deferred operation: {error}");
            }
        }
    }
}
