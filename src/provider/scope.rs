//! Scope storage: states, weak references, and the scope arena.
//!
//! Scopes are owned by the [`ScopeHandle`](super::ScopeHandle) that began
//! them; the arena and the per-context scope stacks hold weak references
//! only. A weak reference is an `(index, generation)` pair validated against
//! the slot's live generation at lookup, so a never-disposed, abandoned
//! scope is observed dead and its slot is reclaimed without crashing any
//! in-flight resolution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::internal::InstanceCache;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// One bounded caching unit: an opaque id plus the local instance cache.
pub(crate) struct ScopeState {
    pub(crate) id: Arc<str>,
    pub(crate) cache: InstanceCache,
}

impl ScopeState {
    /// The container-lifetime root scope.
    pub(crate) fn root() -> Self {
        Self {
            id: Arc::from("root"),
            cache: InstanceCache::new(),
        }
    }

    /// A fresh scope with an empty cache and a unique id.
    pub(crate) fn fresh() -> Self {
        let n = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: Arc::from(format!("scope-{}", n).as_str()),
            cache: InstanceCache::new(),
        }
    }
}

/// Weak reference into the arena: valid only while the slot's generation
/// matches and the owning handle is still alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScopeRef {
    index: usize,
    generation: u64,
}

struct Slot {
    generation: u64,
    scope: Weak<ScopeState>,
}

struct ArenaInner {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

/// Arena of begun scopes.
///
/// Slots are free-listed; releasing a slot bumps its generation so stale
/// references can never resurrect a reused slot.
pub(crate) struct ScopeArena {
    inner: Mutex<ArenaInner>,
}

impl ScopeArena {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(ArenaInner {
                slots: Vec::new(),
                free: Vec::new(),
            }),
        }
    }

    /// Tracks a newly begun scope, returning its weak reference.
    pub(crate) fn insert(&self, scope: &Arc<ScopeState>) -> ScopeRef {
        let mut inner = self.inner.lock();
        if let Some(index) = inner.free.pop() {
            let slot = &mut inner.slots[index];
            slot.scope = Arc::downgrade(scope);
            ScopeRef {
                index,
                generation: slot.generation,
            }
        } else {
            inner.slots.push(Slot {
                generation: 0,
                scope: Arc::downgrade(scope),
            });
            ScopeRef {
                index: inner.slots.len() - 1,
                generation: 0,
            }
        }
    }

    /// Resolves a weak reference to its live scope.
    ///
    /// A dead reference (disposed, or abandoned by its owner) is pruned:
    /// the slot is reclaimed and `None` is returned.
    pub(crate) fn upgrade(&self, scope_ref: ScopeRef) -> Option<Arc<ScopeState>> {
        let mut inner = self.inner.lock();
        let slot = inner.slots.get(scope_ref.index)?;
        if slot.generation != scope_ref.generation {
            return None;
        }
        if let Some(scope) = slot.scope.upgrade() {
            return Some(scope);
        }
        let slot = &mut inner.slots[scope_ref.index];
        slot.generation = slot.generation.wrapping_add(1);
        slot.scope = Weak::new();
        inner.free.push(scope_ref.index);
        None
    }

    /// Releases a slot at disposal. Idempotent: a stale generation is a
    /// no-op, so double disposal and dispose-after-prune are both safe.
    pub(crate) fn release(&self, scope_ref: ScopeRef) {
        let mut inner = self.inner.lock();
        let Some(slot) = inner.slots.get_mut(scope_ref.index) else {
            return;
        };
        if slot.generation != scope_ref.generation {
            return;
        }
        slot.generation = slot.generation.wrapping_add(1);
        slot.scope = Weak::new();
        inner.free.push(scope_ref.index);
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.inner.lock().slots.len()
    }
}
