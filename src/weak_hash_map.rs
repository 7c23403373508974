//! WeakHashMap: a map holding weak references to both its keys and its
//! values, composed from the identity tracker, weak slots, and the
//! projection adapter.

use crate::identity::{Identity, IdentityTracker};
use crate::projected::{InsertError, KeyProjection, ProjectedMap, ValueProjection};
use crate::weak_slot::WeakSlot;
use core::hash::BuildHasher;
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;
use std::rc::Rc;

impl<T, S> KeyProjection for IdentityTracker<T, S>
where
    S: BuildHasher,
{
    type Outer = Rc<T>;
    type Stored = Identity;

    fn key_in(&mut self, key: &Rc<T>) -> Identity {
        self.track(key)
    }

    fn key_lookup(&self, key: &Rc<T>) -> Option<Identity> {
        self.lookup(key)
    }

    fn key_out(&self, stored: &Identity) -> Option<Rc<T>> {
        self.resolve(*stored)
    }
}

/// Value projection that stores each value as a fresh [`WeakSlot`].
pub struct WeakValues<V>(PhantomData<V>);

impl<V> WeakValues<V> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Default for WeakValues<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ValueProjection for WeakValues<V> {
    type Outer = Rc<V>;
    type Stored = WeakSlot<V>;

    fn value_in(&self, value: &Rc<V>) -> WeakSlot<V> {
        WeakSlot::new(value)
    }

    fn value_out(&self, stored: &WeakSlot<V>) -> Option<Rc<V>> {
        stored.target()
    }
}

/// A map whose entries keep neither their keys nor their values alive.
///
/// Keys are compared by allocation identity only: clones of one `Rc` are
/// the same key, distinct allocations with equal pointees are different
/// keys, and neither `K` nor `V` needs `Eq` or `Hash`. Entries whose key
/// or value has been reclaimed stay in the map, invisible to resolution
/// but counted by [`len`](Self::len), until [`purge`](Self::purge), a
/// drained [`live`](Self::live) pass, removal, or [`clear`](Self::clear).
pub struct WeakHashMap<K, V, S = RandomState>
where
    S: BuildHasher,
{
    map: ProjectedMap<IdentityTracker<K, S>, WeakValues<V>, S>,
}

impl<K, V> WeakHashMap<K, V> {
    pub fn new() -> Self {
        Self {
            map: ProjectedMap::new(IdentityTracker::new(), WeakValues::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: ProjectedMap::with_capacity(
                IdentityTracker::with_capacity(capacity),
                WeakValues::new(),
                capacity,
            ),
        }
    }

    /// Build a map from initial pairs under strict-insert semantics: the
    /// first pair whose key identity repeats fails the whole construction.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, InsertError>
    where
        I: IntoIterator<Item = (Rc<K>, Rc<V>)>,
    {
        let pairs = pairs.into_iter();
        let mut map = Self::with_capacity(pairs.size_hint().0);
        for (key, value) in pairs {
            map.insert(&key, &value)?;
        }
        Ok(map)
    }
}

impl<K, V> Default for WeakHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> WeakHashMap<K, V, S>
where
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            map: ProjectedMap::with_hasher(
                IdentityTracker::with_hasher(hasher.clone()),
                WeakValues::new(),
                hasher,
            ),
        }
    }

    fn tracker(&self) -> &IdentityTracker<K, S> {
        self.map.key_projection()
    }

    fn tracker_mut(&mut self) -> &mut IdentityTracker<K, S> {
        self.map.key_projection_mut()
    }

    /// Number of entries, dead ones included. Callers wanting a live count
    /// purge first or drain [`live`](Self::live).
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Strict insert. Fails on an entry already present for this key's
    /// identity, live value or not, leaving the map unchanged.
    pub fn insert(&mut self, key: &Rc<K>, value: &Rc<V>) -> Result<(), InsertError> {
        self.map.insert(key, value)
    }

    /// Whether an entry exists for this key's identity. Says nothing about
    /// the stored value, which may already be reclaimed.
    pub fn contains_key(&self, key: &Rc<K>) -> bool {
        self.map.contains_key(key)
    }

    /// Tri-state lookup: `None` if no entry exists for this key's
    /// identity, `Some(None)` if an entry exists but its value has been
    /// reclaimed, `Some(Some(value))` otherwise.
    pub fn get(&self, key: &Rc<K>) -> Option<Option<Rc<V>>> {
        self.map.get(key)
    }

    /// Replace any entry for this key's identity with a fresh slot for
    /// `value`. A displaced slot is dropped, releasing its weak handle.
    pub fn set(&mut self, key: &Rc<K>, value: &Rc<V>) {
        let _displaced = self.map.set(key, value);
    }

    /// Remove the entry for this key's identity, dropping its slot.
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, key: &Rc<K>) -> bool {
        self.map.remove(key).is_some()
    }

    /// Drop every entry and every identity record, releasing all weak
    /// handles now rather than when the map itself is dropped.
    pub fn clear(&mut self) {
        self.map.source_mut().clear();
        self.tracker_mut().clear();
    }

    /// Remove every entry whose key or value has been reclaimed, then drop
    /// dead identity records. An entry is eligible the instant either side
    /// reports dead; entries with both sides live are never touched.
    pub fn purge(&mut self) {
        let dead: Vec<Identity> = self
            .map
            .source()
            .iter()
            .filter(|(id, slot)| !self.tracker().is_alive(**id) || !slot.is_alive())
            .map(|(id, _)| *id)
            .collect();
        for id in dead {
            self.map.source_mut().remove(&id);
        }
        self.tracker_mut().purge();
    }

    /// Read-through view of every entry. Reclaimed sides appear as `None`.
    pub fn iter(&self) -> impl Iterator<Item = (Option<Rc<K>>, Option<Rc<V>>)> + '_ {
        self.map.iter()
    }

    /// Iterate the `(key, value)` pairs that are both resolvable at the
    /// moment they are visited. Entries found dead are remembered and
    /// removed once the iterator is fully drained; abandoning it early
    /// removes nothing.
    pub fn live(&mut self) -> Live<'_, K, V, S> {
        let pending: Vec<Identity> = self.map.source().keys().copied().collect();
        Live {
            map: self,
            pending: pending.into_iter(),
            dead: Vec::new(),
            drained: false,
        }
    }
}

/// Lazy live-pair iterator returned by [`WeakHashMap::live`].
pub struct Live<'a, K, V, S = RandomState>
where
    S: BuildHasher,
{
    map: &'a mut WeakHashMap<K, V, S>,
    pending: std::vec::IntoIter<Identity>,
    dead: Vec<Identity>,
    drained: bool,
}

impl<K, V, S> Iterator for Live<'_, K, V, S>
where
    S: BuildHasher + Clone + Default,
{
    type Item = (Rc<K>, Rc<V>);

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.pending.by_ref() {
            let key = self.map.tracker().resolve(id);
            let value = self
                .map
                .map
                .source()
                .get(&id)
                .and_then(|slot| slot.target());
            match (key, value) {
                (Some(key), Some(value)) => return Some((key, value)),
                _ => self.dead.push(id),
            }
        }

        // Fully drained: apply the deferred removals exactly once. An
        // identity record stays when only the value side died.
        if !self.drained {
            self.drained = true;
            for id in self.dead.drain(..) {
                self.map.map.source_mut().remove(&id);
                if !self.map.tracker().is_alive(id) {
                    self.map.tracker_mut().release(id);
                }
            }
        }
        None
    }
}
