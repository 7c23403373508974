//! ProjectedMap: presents a storage map under different key and value
//! types through two independent projection pairs.

use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use std::collections::hash_map::RandomState;
use thiserror::Error;

/// Key-side projection between an outer key type and the stored key type.
pub trait KeyProjection {
    type Outer;
    type Stored;

    /// Project a key for insertion. May record state for a first-seen key,
    /// hence `&mut self`.
    fn key_in(&mut self, key: &Self::Outer) -> Self::Stored;

    /// Project a key for lookup, without side effects. `None` means the
    /// key cannot currently be present in the storage map.
    fn key_lookup(&self, key: &Self::Outer) -> Option<Self::Stored>;

    /// Recover the outer key from a stored key, or `None` once it is no
    /// longer recoverable.
    fn key_out(&self, stored: &Self::Stored) -> Option<Self::Outer>;
}

/// Value-side projection between an outer value type and the stored value
/// type.
pub trait ValueProjection {
    type Outer;
    type Stored;

    fn value_in(&self, value: &Self::Outer) -> Self::Stored;

    /// Recover the outer value from a stored value, or `None` once it is
    /// no longer recoverable.
    fn value_out(&self, stored: &Self::Stored) -> Option<Self::Outer>;
}

/// Key projection that stores the outer key unchanged.
pub struct IdentityKeys<T>(PhantomData<T>);

impl<T> IdentityKeys<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for IdentityKeys<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> KeyProjection for IdentityKeys<T> {
    type Outer = T;
    type Stored = T;

    fn key_in(&mut self, key: &T) -> T {
        key.clone()
    }

    fn key_lookup(&self, key: &T) -> Option<T> {
        Some(key.clone())
    }

    fn key_out(&self, stored: &T) -> Option<T> {
        Some(stored.clone())
    }
}

/// Value projection that stores the outer value unchanged.
pub struct IdentityValues<T>(PhantomData<T>);

impl<T> IdentityValues<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for IdentityValues<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ValueProjection for IdentityValues<T> {
    type Outer = T;
    type Stored = T;

    fn value_in(&self, value: &T) -> T {
        value.clone()
    }

    fn value_out(&self, stored: &T) -> Option<T> {
        Some(stored.clone())
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum InsertError {
    /// An entry for this key already exists in the storage map.
    #[error("duplicate key")]
    DuplicateKey,
}

/// A map over outer `(key, value)` types backed by a storage map over the
/// projected types. Every operation translates through the projection
/// pairs and delegates to storage; the raw storage map stays reachable via
/// [`source`](Self::source) for layered components that need operations
/// the projected surface cannot express.
pub struct ProjectedMap<KP, VP, S = RandomState>
where
    KP: KeyProjection,
    VP: ValueProjection,
{
    storage: HashMap<KP::Stored, VP::Stored, S>,
    keys: KP,
    values: VP,
}

impl<KP, VP, S> Default for ProjectedMap<KP, VP, S>
where
    KP: KeyProjection + Default,
    VP: ValueProjection + Default,
    KP::Stored: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new(KP::default(), VP::default())
    }
}

impl<KP, VP, S> ProjectedMap<KP, VP, S>
where
    KP: KeyProjection,
    VP: ValueProjection,
    KP::Stored: Eq + Hash,
    S: BuildHasher + Default,
{
    pub fn new(keys: KP, values: VP) -> Self {
        Self {
            storage: HashMap::with_hasher(S::default()),
            keys,
            values,
        }
    }

    pub fn with_capacity(keys: KP, values: VP, capacity: usize) -> Self {
        Self {
            storage: HashMap::with_capacity_and_hasher(capacity, S::default()),
            keys,
            values,
        }
    }
}

impl<KP, VP, S> ProjectedMap<KP, VP, S>
where
    KP: KeyProjection,
    VP: ValueProjection,
    KP::Stored: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(keys: KP, values: VP, hasher: S) -> Self {
        Self {
            storage: HashMap::with_hasher(hasher),
            keys,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Insert under the storage map's duplicate rule for the projected
    /// key. The value is only projected in when the insert succeeds, and a
    /// failed insert leaves the storage map unchanged.
    pub fn insert(&mut self, key: &KP::Outer, value: &VP::Outer) -> Result<(), InsertError> {
        let stored_key = self.keys.key_in(key);
        match self.storage.entry(stored_key) {
            Entry::Occupied(_) => Err(InsertError::DuplicateKey),
            Entry::Vacant(e) => {
                e.insert(self.values.value_in(value));
                Ok(())
            }
        }
    }

    /// Overwrite the entry for this key, returning the displaced stored
    /// value if one existed.
    pub fn set(&mut self, key: &KP::Outer, value: &VP::Outer) -> Option<VP::Stored> {
        let stored_key = self.keys.key_in(key);
        let stored_value = self.values.value_in(value);
        self.storage.insert(stored_key, stored_value)
    }

    pub fn contains_key(&self, key: &KP::Outer) -> bool {
        self.keys
            .key_lookup(key)
            .map(|k| self.storage.contains_key(&k))
            .unwrap_or(false)
    }

    /// Tri-state lookup: `None` when no entry exists for the key,
    /// `Some(None)` when an entry exists but its value no longer projects
    /// out, `Some(Some(value))` otherwise.
    pub fn get(&self, key: &KP::Outer) -> Option<Option<VP::Outer>> {
        let stored_key = self.keys.key_lookup(key)?;
        let stored_value = self.storage.get(&stored_key)?;
        Some(self.values.value_out(stored_value))
    }

    /// Remove the entry for this key, returning its stored value.
    pub fn remove(&mut self, key: &KP::Outer) -> Option<VP::Stored> {
        let stored_key = self.keys.key_lookup(key)?;
        self.storage.remove(&stored_key)
    }

    /// Read-through view of every storage entry under the outer types.
    /// Sides that no longer project out appear as `None`. Holding the
    /// iterator borrows the map, so storage cannot change underneath it.
    pub fn iter(&self) -> impl Iterator<Item = (Option<KP::Outer>, Option<VP::Outer>)> + '_ {
        self.storage
            .iter()
            .map(|(k, v)| (self.keys.key_out(k), self.values.value_out(v)))
    }

    pub fn source(&self) -> &HashMap<KP::Stored, VP::Stored, S> {
        &self.storage
    }

    pub fn source_mut(&mut self) -> &mut HashMap<KP::Stored, VP::Stored, S> {
        &mut self.storage
    }

    pub fn key_projection(&self) -> &KP {
        &self.keys
    }

    pub fn key_projection_mut(&mut self) -> &mut KP {
        &mut self.keys
    }

    pub fn value_projection(&self) -> &VP {
        &self.values
    }
}
