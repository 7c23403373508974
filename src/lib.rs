//! weak-hashmap: a single-threaded map whose entries hold weak references
//! to both their keys and their values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: dictionary semantics (uniqueness, lookup, enumeration, removal)
//!   that stay correct while keys and values can be reclaimed between any
//!   two operations, built in small layers so each piece can be reasoned
//!   about independently.
//! - Layers:
//!   - IdentityTracker<T, S>: maps an `Rc` allocation's reference identity
//!     to a stable `Identity` surrogate; a hashbrown address index over
//!     slotmap storage, so surrogates stay comparable, hashable, and
//!     storable after their object is gone while resolving them yields
//!     `None` rather than an error.
//!   - WeakSlot<T>: one weak handle with equality and hashing cached from
//!     the target's identity at construction, usable as a map element for
//!     the rest of its life, with an idempotent explicit release.
//!   - ProjectedMap<KP, VP, S>: generic adapter presenting a storage map
//!     under outer key/value types via two independent projection pairs;
//!     identity projections let weak-key-only and weak-value-only maps
//!     compose from the same adapter.
//!   - WeakHashMap<K, V, S>: public API composing the three over storage
//!     of `Identity -> WeakSlot<V>`, plus purge and live-drain.
//!
//! Constraints
//! - Single-threaded: `Rc`/`Weak` make everything `!Send`/`!Sync`.
//! - Keys compare by allocation identity only; `K` and `V` carry no
//!   `Eq`/`Hash` bounds anywhere in the crate.
//! - The map holds no strong references: storing an entry never keeps its
//!   key or value alive, and reclamation needs no notification.
//! - `is_alive` is advisory everywhere; obtaining an object is always one
//!   atomic `Weak::upgrade`, never check-then-use.
//! - `len` counts dead entries until a purge, a drained `live()` pass, or
//!   an explicit removal.
//!
//! Why this split?
//! - Localize invariants: the tracker owns identity stability, the slot
//!   owns equality-across-death, the adapter owns type translation, and
//!   the weak map only composes them.
//! - The adapter is reusable: swapping one projection pair for an identity
//!   pair yields weak-key-only or weak-value-only maps without new map
//!   code.
//!
//! Reclamation model
//! - `Rc<T>` is the strong handle; `Rc::downgrade` creates the weak
//!   handle; `Weak::strong_count() > 0` is the advisory presence check;
//!   `Weak::upgrade` is the atomic resolve-or-fail. Reclamation is the
//!   moment the last external strong handle drops; the collection is never
//!   notified and discovers deaths lazily.
//! - Releasing a weak handle early matters: an allocation's memory is
//!   retained until its last `Weak` drops, so `clear`, `remove`, `set`,
//!   `purge`, and a drained `live()` pass all drop the handles they
//!   displace instead of letting them linger.
//!
//! Notes and non-goals
//! - No `Send`/`Sync` variant; no internal locking exists or is needed.
//! - No real-time eviction: dead entries persist until an explicit or
//!   enumeration-triggered purge.
//! - `contains_key` and `len` intentionally ignore liveness (a dead entry
//!   is still an entry); callers can rely on that to detect pending-purge
//!   backlog.
//! - Public API surface is `WeakHashMap` plus the reusable lower layers;
//!   each lower layer is independently constructible and testable.

pub mod identity;
pub mod projected;
pub mod weak_hash_map;
pub mod weak_slot;

// Public surface
pub use identity::{Identity, IdentityTracker};
pub use projected::{
    IdentityKeys, IdentityValues, InsertError, KeyProjection, ProjectedMap, ValueProjection,
};
pub use weak_hash_map::{Live, WeakHashMap, WeakValues};
pub use weak_slot::WeakSlot;
