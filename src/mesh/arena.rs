//! Generational record arena.
//!
//! [`Arena`] is the storage primitive behind every entity pool of a
//! [`TriMesh`](super::TriMesh). It wraps a `slotmap::SlotMap`, which gives
//! amortized O(1) allocation, a free list of released slots, and generational
//! keys. Releasing a slot bumps its generation, so any copy of the old key stops
//! resolving: reads through it return `None` (or [`MeshError::StaleHandle`] via
//! [`Arena::record`]) rather than the record that later reuses the slot.
//!
//! # Example
//!
//! ```
//! use halfmesh::mesh::{Arena, VertexKey};
//!
//! let mut arena: Arena<VertexKey, f64> = Arena::new("vertex");
//! let a = arena.allocate(1.0);
//! assert_eq!(arena.get(a), Some(&1.0));
//!
//! arena.release(a);
//! let b = arena.allocate(2.0);
//! assert!(arena.get(a).is_none());
//! assert!(arena.record(a).is_err());
//! assert_eq!(arena.get(b), Some(&2.0));
//! ```

use slotmap::{Key, SecondaryMap, SlotMap};

use crate::error::{MeshError, Result};

/// A growable pool of records of type `T` addressed by keys of type `K`.
#[derive(Debug, Clone)]
pub struct Arena<K: Key, T> {
    slots: SlotMap<K, T>,
    kind: &'static str,
}

impl<K: Key, T> Arena<K, T> {
    /// Create an empty arena. `kind` names the entity in stale-handle errors.
    pub fn new(kind: &'static str) -> Self {
        Self::with_capacity(kind, 0)
    }

    /// Create an arena with room for `capacity` records.
    pub fn with_capacity(kind: &'static str, capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
            kind,
        }
    }

    // ==================== Allocation ====================

    /// Store a record and return its key.
    ///
    /// Released slots are reused before the arena grows.
    #[inline]
    pub fn allocate(&mut self, record: T) -> K {
        self.slots.insert(record)
    }

    /// Release a slot, returning its record.
    ///
    /// Returns `None` if the key is already stale.
    pub fn release(&mut self, key: K) -> Option<T> {
        self.slots.remove(key)
    }

    // ==================== Accessors ====================

    /// Get the record for a key, if it is still live.
    #[inline]
    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key)
    }

    /// Get a mutable record for a key, if it is still live.
    #[inline]
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key)
    }

    /// Get the record for a key, failing with [`MeshError::StaleHandle`].
    #[inline]
    pub fn record(&self, key: K) -> Result<&T> {
        self.slots
            .get(key)
            .ok_or(MeshError::StaleHandle { kind: self.kind })
    }

    /// Mutable variant of [`Arena::record`].
    #[inline]
    pub fn record_mut(&mut self, key: K) -> Result<&mut T> {
        let kind = self.kind;
        self.slots
            .get_mut(key)
            .ok_or(MeshError::StaleHandle { kind })
    }

    /// Whether the key still addresses a live record.
    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the arena holds no live records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of records the arena can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    // ==================== Iteration ====================

    /// Iterate over live `(key, record)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.slots.iter()
    }

    /// Iterate mutably over live `(key, record)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> + '_ {
        self.slots.iter_mut()
    }

    /// Iterate over live keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.keys()
    }

    /// Iterate over live records in slot order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.values()
    }

    /// Dense 0-based position of every live key, in iteration order.
    ///
    /// Used when a mesh is flattened into index arrays.
    pub fn ordinals(&self) -> SecondaryMap<K, usize> {
        let mut ordinals = SecondaryMap::with_capacity(self.slots.len());
        for (i, key) in self.slots.keys().enumerate() {
            ordinals.insert(key, i);
        }
        ordinals
    }
}
