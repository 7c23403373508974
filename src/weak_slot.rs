//! WeakSlot: a weak handle with identity-based equality that stays
//! well-defined after its target is reclaimed.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

/// One weak reference with value-style equality and hashing.
///
/// Equality and hash derive from the target's allocation address, captured
/// once at construction and never recomputed, so slots remain usable as map
/// keys or elements after their target is gone. Two slots wrapping the same
/// allocation compare equal for the rest of their lives.
pub struct WeakSlot<T> {
    weak: Weak<T>,
    addr: usize,
}

impl<T> WeakSlot<T> {
    pub fn new(target: &Rc<T>) -> Self {
        Self {
            weak: Rc::downgrade(target),
            addr: Rc::as_ptr(target) as usize,
        }
    }

    /// Advisory liveness. The target may be reclaimed between this check
    /// and any later use; [`target`](Self::target) is the only trustworthy
    /// accessor.
    pub fn is_alive(&self) -> bool {
        self.weak.strong_count() > 0
    }

    /// Resolve the target in a single attempt. `None` once the target has
    /// been reclaimed or the slot released.
    pub fn target(&self) -> Option<Rc<T>> {
        self.weak.upgrade()
    }

    /// Drop the weak handle in place, letting the target allocation's
    /// memory be freed without waiting for the slot itself to be dropped.
    /// Idempotent; equality and hashing are unaffected.
    pub fn release(&mut self) {
        self.weak = Weak::new();
    }
}

impl<T> PartialEq for WeakSlot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl<T> Eq for WeakSlot<T> {}

impl<T> Hash for WeakSlot<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

impl<T> fmt::Debug for WeakSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakSlot")
            .field("addr", &(self.addr as *const ()))
            .field("alive", &self.is_alive())
            .finish()
    }
}
