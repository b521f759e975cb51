//! Core identifiers, bit layouts, and the growable bitset.
//!
//! This module defines the **fundamental types, identifiers, and bit layouts**
//! shared across the storage engine: entity identity encoding, archetype and
//! component identifiers, and the [`BitSet`] used for archetype signatures and
//! query masks.
//!
//! ## Design Philosophy
//!
//! The engine is designed around:
//!
//! - **Dense storage**
//! - **Bitset-based signatures**
//! - **Stable numeric identifiers**
//!
//! To support these goals efficiently, this module:
//!
//! - Encodes identities into a single 64-bit value,
//! - Represents storage-type sets as word arrays of `u64`,
//! - Uses small, copyable numeric IDs for all engine concepts.
//!
//! ## Identity Representation
//!
//! Identities are encoded as a packed 64-bit integer with the following layout:
//!
//! ```text
//! | generation | index |
//! ```
//!
//! - **Index** identifies the slot within the meta table.
//! - **Generation** enables stale-identity detection after despawning.
//!
//! ## Signatures and Masks
//!
//! Component storage types are identified by compact [`TypeIndex`] values.
//! Archetypes are described by [`BitSet`]s indicating which storage types they
//! contain. Because relation pairs are interned on demand, the set of indices
//! grows over the process lifetime; the bitset therefore grows its word array
//! lazily instead of using a fixed capacity.
//!
//! Matching two bitsets (subset and disjointness tests) is word-wise and
//! costs O(words), independent of how many individual types are set.

/// Bit-width type used for compile-time layout calculations.
pub type Bits = u8;

/// Packed 64-bit entity identity value.
pub type EntityId = u64;
/// Index into the entity meta table.
pub type IndexId = u32;
/// Generation counter used to detect stale identities.
pub type GenerationId = u32;

/// Unique identifier for an archetype.
pub type ArchetypeId = u32;
/// Stable identifier for a registered component type.
pub type ComponentId = u32;
/// Stable bit index assigned to a `(component, target)` pair.
pub type TypeIndex = u32;

/// Total number of bits in an [`EntityId`].
pub const ENTITY_BITS: Bits = 64;
/// Number of bits reserved for the meta-table index.
pub const INDEX_BITS: Bits = 32;
/// Number of bits reserved for the generation counter.
pub const GENERATION_BITS: Bits = ENTITY_BITS - INDEX_BITS;

const _: [(); 1] = [(); (INDEX_BITS > 0) as usize];
const _: [(); 1] = [(); (INDEX_BITS < ENTITY_BITS) as usize];
const _: [(); 1] = [(); (GENERATION_BITS > 0) as usize];

const fn mask(bits: Bits) -> EntityId {
    if bits == 0 { 0 } else { ((1 as EntityId) << bits) - 1 }
}

/// Mask selecting the index portion of an [`EntityId`].
pub const INDEX_MASK: EntityId = mask(INDEX_BITS);

/// Initial number of slots in the entity meta table.
///
/// The table doubles in size whenever the fresh-index head passes the end,
/// so this is a starting point, not a limit.
pub const INITIAL_META_CAP: usize = 512;

/// Growable bitset representing a set of storage types.
///
/// Backed by a word array of `u64`. The word array grows lazily when a bit
/// beyond the current capacity is set; absent words are treated as zero by
/// every query operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    /// Creates an empty bitset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bit corresponding to `index`, growing the word array if needed.
    #[inline]
    pub fn set(&mut self, index: TypeIndex) {
        let word = (index as usize) / 64;
        let bit = (index as usize) % 64;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    /// Clears the bit corresponding to `index`.
    #[inline]
    pub fn clear(&mut self, index: TypeIndex) {
        let word = (index as usize) / 64;
        let bit = (index as usize) % 64;
        if word < self.words.len() {
            self.words[word] &= !(1u64 << bit);
        }
    }

    /// Returns `true` if `index` is present in this set.
    #[inline]
    pub fn has(&self, index: TypeIndex) -> bool {
        let word = (index as usize) / 64;
        let bit = (index as usize) % 64;
        match self.words.get(word) {
            Some(&w) => (w >> bit) & 1 == 1,
            None => false,
        }
    }

    /// Returns `true` if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns `true` if every bit in `self` is also set in `other`.
    ///
    /// Word-wise; words beyond either array are treated as zero.
    #[inline]
    pub fn is_subset_of(&self, other: &BitSet) -> bool {
        for (word, &bits) in self.words.iter().enumerate() {
            let other_bits = other.words.get(word).copied().unwrap_or(0);
            if bits & !other_bits != 0 {
                return false;
            }
        }
        true
    }

    /// Returns `true` if `self` and `other` share no set bits.
    #[inline]
    pub fn is_disjoint_with(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// Iterates over all set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TypeIndex> + '_ {
        self.words.iter().enumerate().flat_map(|(word, &w)| {
            let base = word * 64;
            let mut bits = w;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some((base + tz) as TypeIndex)
            })
        })
    }
}
