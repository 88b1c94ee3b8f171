//! Persistent roots for host functions held by native code.

use std::fmt;

use rustc_hash::FxHashMap;

use super::{FunctionRef, WeakRuntime};

/// Counters describing the persistent table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistentStats {
    /// Roots currently held
    pub live: usize,
    /// Roots ever created
    pub created: u64,
    /// Roots ever released
    pub released: u64,
}

#[derive(Default)]
pub(crate) struct PersistentTable {
    roots: FxHashMap<u64, FunctionRef>,
    next_id: u64,
    released: u64,
}

impl PersistentTable {
    pub(crate) fn insert(&mut self, function: FunctionRef) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.roots.insert(id, function);
        id
    }

    /// Remove a root, handing the function back so the caller can drop it
    /// outside any borrow of the table.
    pub(crate) fn remove(&mut self, id: u64) -> Option<FunctionRef> {
        let removed = self.roots.remove(&id);
        if removed.is_some() {
            self.released += 1;
        }
        removed
    }

    pub(crate) fn stats(&self) -> PersistentStats {
        PersistentStats {
            live: self.roots.len(),
            created: self.next_id,
            released: self.released,
        }
    }
}

/// A host function rooted in the runtime on behalf of native code.
///
/// Not `Clone`: a persistent handle is released by its `Drop`, so there is
/// exactly one release per root. Share it through `Rc` to get copies.
pub struct Persistent {
    id: u64,
    function: FunctionRef,
    owner: WeakRuntime,
}

impl Persistent {
    pub(crate) fn new(id: u64, function: FunctionRef, owner: WeakRuntime) -> Self {
        Self {
            id,
            function,
            owner,
        }
    }

    /// The rooted function.
    pub fn function(&self) -> &FunctionRef {
        &self.function
    }

    /// The runtime that owns the root.
    pub fn owner(&self) -> &WeakRuntime {
        &self.owner
    }
}

impl Drop for Persistent {
    fn drop(&mut self) {
        // A dropped runtime has already released every root.
        let Some(runtime) = self.owner.upgrade() else {
            return;
        };
        if runtime.release_persistent(self.id) {
            tracing::trace!(id = self.id, function = %self.function.name(), "released persistent");
        } else {
            tracing::error!(id = self.id, "persistent handle released twice");
            debug_assert!(false, "persistent handle {} released twice", self.id);
        }
    }
}

impl fmt::Debug for Persistent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistent")
            .field("id", &self.id)
            .field("function", &self.function.name())
            .finish()
    }
}
