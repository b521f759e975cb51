//! Query masks: include/exclude predicates over archetype signatures.
//!
//! A [`Mask`] is built incrementally with [`with`](Mask::with) /
//! [`without`](Mask::without) calls that resolve a component type
//! (optionally scoped to a relation target) to its stable bit index and set
//! it in the include or exclude bitset. Matching an archetype against a mask
//! is a word-wise containment plus disjointness test, O(words in the
//! bitset) rather than O(component types), so dispatch stays cheap as the
//! schema grows.
//!
//! Relation-aware construction additionally records auxiliary lists that a
//! query layer can use to resolve relation endpoints:
//!
//! - `target_relations` — included storage types with a concrete target,
//! - `source_relations` — excluded storage types with a concrete target,
//! - `any_relations` — component types included with the [`Identity::ANY`]
//!   wildcard; these match an archetype containing the component under
//!   *some* target (no archetype ever stores an `ANY` pair, so the wildcard
//!   cannot be a bit).

use crate::engine::archetype::Archetype;
use crate::engine::component::{component_id_of, StorageType};
use crate::engine::entity::Identity;
use crate::engine::types::{BitSet, ComponentId};

/// A bitset pair (include/exclude) plus relation bookkeeping, used to test
/// whether an archetype's type set satisfies a query.
#[derive(Default)]
pub struct Mask {
    include: BitSet,
    exclude: BitSet,
    target_relations: Vec<StorageType>,
    source_relations: Vec<StorageType>,
    any_relations: Vec<ComponentId>,
}

impl Mask {
    /// Creates an empty mask, which matches every archetype.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the plain (untargeted) component `T`.
    pub fn with<T: 'static>(self) -> Self {
        self.with_relation::<T>(Identity::NONE)
    }

    /// Requires component `T` targeting `target`.
    ///
    /// Passing [`Identity::ANY`] turns the requirement into a wildcard: the
    /// archetype must contain `T` under some target. A concrete target is
    /// additionally recorded in the target-relation list for the query
    /// layer.
    pub fn with_relation<T: 'static>(mut self, target: Identity) -> Self {
        if target.is_any() {
            self.any_relations.push(component_id_of::<T>());
            return self;
        }

        let component = StorageType::relation::<T>(target);
        self.include.set(component.index());
        if component.is_relation() {
            self.target_relations.push(component);
        }
        self
    }

    /// Excludes the plain (untargeted) component `T`.
    pub fn without<T: 'static>(self) -> Self {
        self.without_relation::<T>(Identity::NONE)
    }

    /// Excludes component `T` targeting `target`.
    ///
    /// A concrete target is additionally recorded in the source-relation
    /// list for the query layer. An [`Identity::ANY`] target sets a bit no
    /// archetype carries, making the exclusion structurally inert.
    pub fn without_relation<T: 'static>(mut self, target: Identity) -> Self {
        let component = StorageType::relation::<T>(target);
        self.exclude.set(component.index());
        if component.is_relation() && !target.is_any() {
            self.source_relations.push(component);
        }
        self
    }

    /// The include bitset.
    pub fn include(&self) -> &BitSet {
        &self.include
    }

    /// The exclude bitset.
    pub fn exclude(&self) -> &BitSet {
        &self.exclude
    }

    /// Included relation storage types with a concrete target.
    pub fn target_relations(&self) -> &[StorageType] {
        &self.target_relations
    }

    /// Excluded relation storage types with a concrete target.
    pub fn source_relations(&self) -> &[StorageType] {
        &self.source_relations
    }

    /// Component types required under the `ANY` wildcard.
    pub fn any_relations(&self) -> &[ComponentId] {
        &self.any_relations
    }

    /// Returns `true` if the archetype's type set satisfies this mask.
    ///
    /// The archetype must contain every included bit, none of the excluded
    /// bits, and at least one storage type of every wildcard component.
    pub fn matches(&self, archetype: &Archetype) -> bool {
        self.include.is_subset_of(archetype.signature())
            && self.exclude.is_disjoint_with(archetype.signature())
            && self
                .any_relations
                .iter()
                .all(|&component| archetype.contains_component(component))
    }
}
