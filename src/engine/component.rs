//! Component type identity and the global storage-type registry.
//!
//! This module assigns stable numeric identifiers to Rust component types and
//! to `(component, relation target)` pairs, and exposes type-erased column
//! factories for archetype construction.
//!
//! ## Purpose
//! The registry decouples component type information (`TypeId`, diagnostic
//! name) from runtime storage, enabling archetypes to hold heterogeneous
//! component columns behind [`TypeErasedColumn`] and masks to address any
//! storage type as a single bit index.
//!
//! ## Design
//! - A component type is registered on first use and assigned a compact
//!   [`ComponentId`].
//! - Each distinct `(component, target)` pair is interned on first use and
//!   assigned a stable [`TypeIndex`], the bit position used by archetype
//!   signatures and query masks. A plain component is the pair with target
//!   [`Identity::NONE`]; attaching the same component type under different
//!   relation targets yields distinct storage types.
//! - A per-component factory function is stored for constructing empty
//!   column storage during archetype creation and deferred replay.
//!
//! ## Invariants
//! - `ComponentId` and `TypeIndex` values are unique and stable for the
//!   lifetime of the process.
//! - A registered component always has a corresponding column factory.
//!
//! ## Concurrency
//! The registry lives behind `OnceLock<RwLock<…>>` because Rust statics
//! require it; resolution takes a read lock on the fast path and upgrades to
//! a write lock only for first-time registration.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::engine::entity::Identity;
use crate::engine::storage::{Column, TypeErasedColumn};
use crate::engine::types::{ComponentId, TypeIndex};

/// Factory function constructing an empty type-erased column for a component.
pub type FactoryFn = fn() -> Box<dyn TypeErasedColumn>;

fn new_column_storage<T: 'static>() -> Box<dyn TypeErasedColumn> {
    Box::new(Column::<T>::new())
}

struct TypeRegistry {
    by_type: HashMap<TypeId, ComponentId>,
    names: Vec<&'static str>,
    factories: Vec<FactoryFn>,
    by_pair: HashMap<(ComponentId, Identity), TypeIndex>,
    next_index: TypeIndex,
}

static REGISTRY: OnceLock<RwLock<TypeRegistry>> = OnceLock::new();

fn registry() -> &'static RwLock<TypeRegistry> {
    REGISTRY.get_or_init(|| {
        RwLock::new(TypeRegistry {
            by_type: HashMap::new(),
            names: Vec::new(),
            factories: Vec::new(),
            by_pair: HashMap::new(),
            next_index: 0,
        })
    })
}

impl TypeRegistry {
    fn register<T: 'static>(&mut self) -> ComponentId {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return existing;
        }

        let component = self.names.len() as ComponentId;
        self.by_type.insert(type_id, component);
        self.names.push(type_name::<T>());
        self.factories.push(new_column_storage::<T>);
        component
    }

    fn intern(&mut self, component: ComponentId, target: Identity) -> TypeIndex {
        if let Some(&index) = self.by_pair.get(&(component, target)) {
            return index;
        }

        let index = self.next_index;
        self.next_index += 1;
        self.by_pair.insert((component, target), index);
        index
    }
}

/// Returns the stable [`ComponentId`] for type `T`, registering it on first
/// use.
///
/// ## Panics
/// Panics if the registry lock is poisoned.
pub fn component_id_of<T: 'static>() -> ComponentId {
    let registry = registry();
    if let Some(&component) = registry.read().unwrap().by_type.get(&TypeId::of::<T>()) {
        return component;
    }
    registry.write().unwrap().register::<T>()
}

/// Returns the diagnostic name recorded for a registered component.
pub fn component_name(component: ComponentId) -> &'static str {
    registry()
        .read()
        .unwrap()
        .names
        .get(component as usize)
        .copied()
        .unwrap_or("<unregistered>")
}

/// Returns the column factory for the given component.
///
/// ## Purpose
/// Used by archetype construction to allocate an empty column for every
/// storage type in a new archetype's type set.
///
/// ## Panics
/// Panics if no component with this id was registered.
pub fn column_factory(component: ComponentId) -> FactoryFn {
    registry().read().unwrap().factories[component as usize]
}

/// A stable identifier for a component type, optionally scoped to a relation
/// target entity.
///
/// Two storage types are equal iff both the component type and the target
/// match; this lets the same component type be attached multiple times to
/// one entity under different relation targets. The interned `index` is the
/// bit position the pair occupies in archetype signatures and query masks,
/// and defines the canonical ordering of archetype type sets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StorageType {
    index: TypeIndex,
    component: ComponentId,
    target: Identity,
}

impl StorageType {
    /// Resolves the storage type for a plain (untargeted) component `T`.
    pub fn of<T: 'static>() -> Self {
        Self::relation::<T>(Identity::NONE)
    }

    /// Resolves the storage type for component `T` targeting `target`.
    ///
    /// Registers `T` and interns the `(component, target)` pair on first
    /// use, so the returned bit index is stable for the process lifetime.
    pub fn relation<T: 'static>(target: Identity) -> Self {
        let registry = registry();

        {
            let read = registry.read().unwrap();
            if let Some(&component) = read.by_type.get(&TypeId::of::<T>()) {
                if let Some(&index) = read.by_pair.get(&(component, target)) {
                    return Self { index, component, target };
                }
            }
        }

        let mut write = registry.write().unwrap();
        let component = write.register::<T>();
        let index = write.intern(component, target);
        Self { index, component, target }
    }

    /// The interned bit index of this `(component, target)` pair.
    #[inline]
    pub fn index(&self) -> TypeIndex {
        self.index
    }

    /// The component type identifier.
    #[inline]
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// The relation target, or [`Identity::NONE`] for a plain component.
    #[inline]
    pub fn target(&self) -> Identity {
        self.target
    }

    /// Returns `true` if this storage type carries a relation target.
    #[inline]
    pub fn is_relation(&self) -> bool {
        !self.target.is_none()
    }

    /// Diagnostic name of the component type.
    pub fn name(&self) -> &'static str {
        component_name(self.component)
    }
}
