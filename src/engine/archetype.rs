//! Archetypes: contiguous storage for entities sharing one exact type set.
//!
//! An [`Archetype`] owns columnar component storage for a fixed set of
//! storage types and the reverse index from row to entity identity. Entities
//! are densely packed using swap-remove semantics, and moving an entity to a
//! different archetype transfers its row column-by-column.
//!
//! ## Invariants
//! - `types` is sorted by bit index and free of duplicates; it is the
//!   canonical, order-independent signature the registry keys archetypes by.
//! - Every column has exactly `entities.len()` rows, and `columns[i]` stores
//!   the component described by `types[i]`.
//! - The root archetype (empty type set) has no columns; its rows consist of
//!   the entity list alone.
//! - Row indices held by the entity meta table are only invalidated by
//!   swap-remove, which reports the displaced entity so the caller can
//!   repair its meta entry.

use std::any::Any;

use crate::engine::component::{column_factory, StorageType};
use crate::engine::entity::Identity;
use crate::engine::error::{ColumnError, EcsResult};
use crate::engine::storage::TypeErasedColumn;
use crate::engine::types::{ArchetypeId, BitSet, ComponentId};

/// Stores all entities that share an identical storage-type signature.
pub struct Archetype {
    id: ArchetypeId,
    types: Box<[StorageType]>,
    signature: BitSet,
    entities: Vec<Identity>,
    columns: Vec<Box<dyn TypeErasedColumn>>,
}

impl Archetype {
    /// Creates an empty archetype for a canonical (sorted, duplicate-free)
    /// type set, allocating one empty column per storage type.
    pub(crate) fn new(id: ArchetypeId, types: Box<[StorageType]>) -> Self {
        debug_assert!(
            types.windows(2).all(|pair| pair[0] < pair[1]),
            "archetype type set must be sorted and duplicate-free"
        );

        let mut signature = BitSet::new();
        for component in types.iter() {
            signature.set(component.index());
        }

        let columns = types
            .iter()
            .map(|component| column_factory(component.component())())
            .collect();

        Self { id, types, signature, entities: Vec::new(), columns }
    }

    /// The identifier assigned by the registry; stable for the archetype's
    /// lifetime.
    #[inline]
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// The canonical sorted type set.
    #[inline]
    pub fn types(&self) -> &[StorageType] {
        &self.types
    }

    /// The signature bitset used for mask matching.
    #[inline]
    pub fn signature(&self) -> &BitSet {
        &self.signature
    }

    /// Number of entities currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// The stored identities, in row order.
    #[inline]
    pub fn entities(&self) -> &[Identity] {
        &self.entities
    }

    /// Returns `true` if the exact storage type (component and target) is
    /// part of this archetype's type set.
    #[inline]
    pub fn contains(&self, component: StorageType) -> bool {
        self.position_of(component).is_some()
    }

    /// Returns `true` if any storage type of the given component is present,
    /// regardless of relation target.
    pub fn contains_component(&self, component: ComponentId) -> bool {
        self.types.iter().any(|t| t.component() == component)
    }

    /// Column slot for a storage type, by binary search over the sorted set.
    #[inline]
    fn position_of(&self, component: StorageType) -> Option<usize> {
        self.types.binary_search(&component).ok()
    }

    /// Borrows the column storing `component`, if present.
    pub fn column(&self, component: StorageType) -> Option<&dyn TypeErasedColumn> {
        self.position_of(component).map(|slot| &*self.columns[slot])
    }

    /// Mutably borrows the column storing `component`, if present.
    pub fn column_mut(&mut self, component: StorageType) -> Option<&mut dyn TypeErasedColumn> {
        self.position_of(component).map(|slot| &mut *self.columns[slot])
    }

    /// Appends an entity row to the column-less root archetype.
    ///
    /// Returns the row the entity was placed in.
    pub(crate) fn push_entity(&mut self, identity: Identity) -> usize {
        debug_assert!(
            self.columns.is_empty(),
            "push_entity is only valid on the column-less root archetype"
        );
        self.entities.push(identity);
        self.entities.len() - 1
    }

    /// Removes the row at `row` from every column and the entity list.
    ///
    /// Returns the identity that was moved into `row` to keep storage dense,
    /// or `None` if the removed row was the last one. The caller must repair
    /// the moved entity's meta entry.
    pub(crate) fn swap_remove_row(&mut self, row: usize) -> EcsResult<Option<Identity>> {
        if row >= self.entities.len() {
            return Err(ColumnError::RowOutOfBounds { row, length: self.entities.len() }.into());
        }

        for column in &mut self.columns {
            column.swap_remove_row(row)?;
        }

        self.entities.swap_remove(row);
        if row < self.entities.len() {
            Ok(Some(self.entities[row]))
        } else {
            Ok(None)
        }
    }

    /// Moves an entity's row from this archetype into `destination`.
    ///
    /// ## Purpose
    /// This is the core operation behind component addition and removal: the
    /// entity transitions to the archetype whose signature matches its new
    /// component set, and its row follows.
    ///
    /// ## Behavior
    /// For each storage type in the destination's type set:
    ///
    /// - **Present in both**: the value at `row` is transferred with
    ///   [`TypeErasedColumn::move_row_into`], swap-removing it here.
    /// - **Destination-only**: the value **must** be supplied in `added`;
    ///   it is inserted with [`TypeErasedColumn::push_erased`].
    ///
    /// Storage types present only in this archetype then have their value at
    /// `row` dropped via swap-remove, and the entity list is updated last.
    /// Every column lands the row at the same destination index, preserving
    /// strict row alignment across columns.
    ///
    /// ## Errors
    /// A dynamically-typed `added` value that does not match its destination
    /// column fails with [`ColumnError::TypeMismatch`] before any column is
    /// touched, so no partial move is observable.
    ///
    /// ## Returns
    /// `(destination_row, swapped)` where `swapped` is the identity moved
    /// into `row` on this side, if any; the caller repairs both meta
    /// entries.
    pub(crate) fn move_row_to(
        &mut self,
        destination: &mut Archetype,
        row: usize,
        mut added: Option<(StorageType, Box<dyn Any>)>,
    ) -> EcsResult<(usize, Option<Identity>)> {
        if row >= self.entities.len() {
            return Err(ColumnError::RowOutOfBounds { row, length: self.entities.len() }.into());
        }

        // Validate the supplied value against its destination column before
        // mutating anything; every later step is infallible for the caller.
        if let Some((component, value)) = &added {
            if let Some(slot) = destination.position_of(*component) {
                let column = &destination.columns[slot];
                let actual = (**value).type_id();
                if column.element_type_id() != actual {
                    return Err(ColumnError::TypeMismatch {
                        expected: column.element_type_id(),
                        expected_name: column.element_type_name(),
                        actual,
                    }
                    .into());
                }
            }
        }

        let identity = self.entities[row];
        let destination_row = destination.entities.len();

        for slot in 0..destination.types.len() {
            let component = destination.types[slot];
            match self.position_of(component) {
                Some(source_slot) => {
                    let (moved_to, _) = self.columns[source_slot]
                        .move_row_into(&mut *destination.columns[slot], row)?;
                    debug_assert_eq!(moved_to, destination_row);
                }
                None => {
                    let Some((added_type, value)) = added.take() else {
                        panic!(
                            "archetype corruption: destination requires {} but no value was supplied",
                            component.name()
                        );
                    };
                    debug_assert_eq!(added_type, component);
                    let moved_to = destination.columns[slot].push_erased(value)?;
                    debug_assert_eq!(moved_to, destination_row);
                }
            }
        }

        for slot in 0..self.types.len() {
            if destination.position_of(self.types[slot]).is_none() {
                self.columns[slot].swap_remove_row(row)?;
            }
        }

        destination.entities.push(identity);
        self.entities.swap_remove(row);
        let swapped = if row < self.entities.len() {
            Some(self.entities[row])
        } else {
            None
        };

        Ok((destination_row, swapped))
    }
}
