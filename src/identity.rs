//! IdentityTracker: stable surrogate identities for `Rc` allocations.

use core::hash::BuildHasher;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use std::rc::{Rc, Weak};

/// Stable stand-in for one allocation's reference identity.
///
/// Two `Identity` values are equal iff they were issued for the same `Rc`
/// allocation while it was tracked. Clones of one `Rc` share an allocation
/// and therefore an `Identity`; two allocations with equal pointees do not.
/// An `Identity` stays comparable, hashable, and storable after its object
/// is reclaimed; resolving it then yields `None`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Identity(DefaultKey);

#[derive(Debug)]
struct Tracked<T> {
    addr: usize,
    hash: u64,
    weak: Weak<T>,
}

/// Registry mapping `Rc` allocations to [`Identity`] surrogates.
///
/// Holds only weak records, so tracking an object never keeps it alive.
/// Tracking is strictly by allocation identity; `T` needs no `Eq` or
/// `Hash` implementation, and any it has is never consulted.
pub struct IdentityTracker<T, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Tracked<T>>, // storage using generational keys
}

impl<T> IdentityTracker<T> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            hasher: Default::default(),
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }
}

impl<T> Default for IdentityTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> IdentityTracker<T, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
        }
    }

    /// Number of tracking records, dead ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn find(&self, addr: usize, hash: u64) -> Option<DefaultKey> {
        self.index
            .find(hash, |&k| {
                self.slots.get(k).map(|t| t.addr == addr).unwrap_or(false)
            })
            .copied()
    }

    /// Return the identity of a tracked live allocation, minting a fresh
    /// one for an allocation seen for the first time.
    pub fn track(&mut self, obj: &Rc<T>) -> Identity {
        let addr = Rc::as_ptr(obj) as usize;
        let hash = self.hasher.hash_one(addr);
        if let Some(k) = self.find(addr, hash) {
            if self.slots[k].weak.strong_count() > 0 {
                return Identity(k);
            }
            // A dead record under this address means the allocation was
            // freed and the address recycled; replace, never resurrect.
            self.release_slot(k);
        }
        let k = self.slots.insert(Tracked {
            addr,
            hash,
            weak: Rc::downgrade(obj),
        });
        self.index
            .insert_unique(hash, k, |&kk| self.slots.get(kk).map(|t| t.hash).unwrap_or(0));
        Identity(k)
    }

    /// Look up the identity of an allocation without tracking it. `None`
    /// means the allocation has never been tracked by this instance.
    pub fn lookup(&self, obj: &Rc<T>) -> Option<Identity> {
        let addr = Rc::as_ptr(obj) as usize;
        let hash = self.hasher.hash_one(addr);
        self.find(addr, hash)
            .filter(|&k| self.slots[k].weak.strong_count() > 0)
            .map(Identity)
    }

    /// Resolve a surrogate back to its object in a single attempt. A
    /// reclaimed or released target yields `None`, never an error.
    pub fn resolve(&self, id: Identity) -> Option<Rc<T>> {
        self.slots.get(id.0).and_then(|t| t.weak.upgrade())
    }

    /// Advisory liveness. The answer may be stale by the time it is acted
    /// on; [`resolve`](Self::resolve) is the only trustworthy accessor.
    pub fn is_alive(&self, id: Identity) -> bool {
        self.slots
            .get(id.0)
            .map(|t| t.weak.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Forget one tracking record, releasing its weak handle. Returns
    /// whether a record existed.
    pub fn release(&mut self, id: Identity) -> bool {
        self.release_slot(id.0)
    }

    /// Drop every record whose object has been reclaimed.
    pub fn purge(&mut self) {
        let dead: Vec<DefaultKey> = self
            .slots
            .iter()
            .filter(|(_, t)| t.weak.strong_count() == 0)
            .map(|(k, _)| k)
            .collect();
        for k in dead {
            self.release_slot(k);
        }
    }

    /// Drop every tracking record.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
    }

    fn release_slot(&mut self, k: DefaultKey) -> bool {
        let Some(record) = self.slots.remove(k) else {
            return false;
        };

        // Unlink from index via occupied entry removal
        self.index
            .find_entry(record.hash, |&kk| kk == k)
            .unwrap()
            .remove();

        true
    }
}
