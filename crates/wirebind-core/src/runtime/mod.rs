//! Minimal host runtime.
//!
//! The marshalling layer needs a host on the other side of the boundary:
//! something that owns function values, calls them, tracks wrapped native
//! instances and roots functions that native code holds on to. This module
//! provides exactly that and nothing more.
//!
//! ## Key Types
//!
//! - [`Runtime`]: cheap-clone handle to the host state
//! - [`FunctionRef`]: a host function value
//! - [`ObjectHandle`]: host-visible identity of a wrapped native instance
//! - [`Persistent`]: a function rooted on behalf of native code
//!
//! Everything runs on one thread. Calls nest re-entrantly on the caller's
//! stack: a host function may call native code which calls back into the
//! host, and so on, bounded by [`RuntimeOptions::max_call_depth`].

mod function;
mod object_heap;
mod persistent;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

pub use function::FunctionRef;
pub use object_heap::ObjectHandle;
pub use persistent::{Persistent, PersistentStats};

use crate::{ConversionError, Dynamic, Exception};
use object_heap::ObjectHeap;
use persistent::PersistentTable;

/// Runtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Maximum nesting of host calls before a `RangeError` is raised.
    pub max_call_depth: usize,
}

impl RuntimeOptions {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_call_depth: 512,
        }
    }
}

struct RuntimeState {
    options: RuntimeOptions,
    heap: RefCell<ObjectHeap>,
    persistents: RefCell<PersistentTable>,
    depth: Cell<usize>,
}

/// Handle to the host runtime.
///
/// Cloning shares the same runtime. No borrow of internal state is held
/// while a host function runs, so bodies may freely re-enter the runtime.
#[derive(Clone)]
pub struct Runtime {
    state: Rc<RuntimeState>,
}

/// Non-owning handle to a [`Runtime`].
#[derive(Clone)]
pub struct WeakRuntime {
    state: Weak<RuntimeState>,
}

impl WeakRuntime {
    pub fn upgrade(&self) -> Option<Runtime> {
        self.state.upgrade().map(|state| Runtime { state })
    }
}

impl fmt::Debug for WeakRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRuntime")
            .field("alive", &(self.state.strong_count() > 0))
            .finish()
    }
}

impl Runtime {
    /// Create a runtime with default options.
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    /// Create a runtime with the given options.
    pub fn with_options(options: RuntimeOptions) -> Self {
        Self {
            state: Rc::new(RuntimeState {
                options,
                heap: RefCell::new(ObjectHeap::new()),
                persistents: RefCell::new(PersistentTable::default()),
                depth: Cell::new(0),
            }),
        }
    }

    /// Options this runtime was created with.
    pub fn options(&self) -> &RuntimeOptions {
        &self.state.options
    }

    /// Non-owning handle, for holders that must not keep the runtime alive.
    pub fn downgrade(&self) -> WeakRuntime {
        WeakRuntime {
            state: Rc::downgrade(&self.state),
        }
    }

    /// Create a host function value.
    ///
    /// The body receives the runtime, the `this` value and the positional
    /// arguments.
    pub fn function<F>(&self, name: impl Into<String>, body: F) -> Dynamic
    where
        F: Fn(&Runtime, &Dynamic, &[Dynamic]) -> Result<Dynamic, Exception> + 'static,
    {
        Dynamic::Function(FunctionRef::new(name.into(), Box::new(body)))
    }

    /// Call a value as a function.
    ///
    /// # Errors
    ///
    /// - `TypeError` if `callee` is not a function
    /// - `RangeError` if the call would exceed the configured nesting depth
    /// - whatever the function body raises
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(
        &self,
        callee: &Dynamic,
        this: &Dynamic,
        args: &[Dynamic],
    ) -> Result<Dynamic, Exception> {
        let Dynamic::Function(function) = callee else {
            return Err(Exception::type_error(format!(
                "{} is not a function",
                callee.type_name()
            )));
        };

        let _depth = DepthGuard::enter(self)?;
        function.invoke(self, this, args)
    }

    /// Current nesting depth of host calls.
    pub fn call_depth(&self) -> usize {
        self.state.depth.get()
    }

    // === Wrapped-instance registry ===

    /// Wrap a native value in a host object.
    pub fn wrap<T: Any>(&self, value: T) -> Dynamic {
        Dynamic::Object(self.state.heap.borrow_mut().allocate(value))
    }

    /// Resolve an object handle to the native instance it wraps.
    pub fn resolve<T: Any>(&self, handle: ObjectHandle) -> Result<Rc<RefCell<T>>, ConversionError> {
        self.state.heap.borrow().resolve::<T>(handle)
    }

    /// Name of the native type behind a live handle.
    pub fn instance_type_name(&self, handle: ObjectHandle) -> Option<&'static str> {
        self.state.heap.borrow().type_name(handle)
    }

    /// Add a host reference to an instance. Returns false for a stale handle.
    pub fn add_ref(&self, handle: ObjectHandle) -> bool {
        self.state.heap.borrow_mut().add_ref(handle)
    }

    /// Drop one host reference to an instance. Returns true if it was freed.
    pub fn release(&self, handle: ObjectHandle) -> bool {
        let freed = self.state.heap.borrow_mut().release(handle);
        freed.is_some()
    }

    /// Host reference count of a live instance.
    pub fn instance_ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        self.state.heap.borrow().ref_count(handle)
    }

    /// Number of live wrapped instances.
    pub fn instance_count(&self) -> usize {
        self.state.heap.borrow().live_count()
    }

    // === Persistent handles ===

    /// Root a function so it stays valid while native code holds it.
    pub fn persist(&self, function: &FunctionRef) -> Persistent {
        let id = self.state.persistents.borrow_mut().insert(function.clone());
        tracing::trace!(id, function = %function.name(), "created persistent");
        Persistent::new(id, function.clone(), self.downgrade())
    }

    pub fn persistent_stats(&self) -> PersistentStats {
        self.state.persistents.borrow().stats()
    }

    pub(crate) fn release_persistent(&self, id: u64) -> bool {
        let removed = self.state.persistents.borrow_mut().remove(id);
        removed.is_some()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("options", &self.state.options)
            .field("call_depth", &self.state.depth.get())
            .field("heap", &*self.state.heap.borrow())
            .field("persistents", &self.state.persistents.borrow().stats())
            .finish()
    }
}

/// Tracks call nesting; restores the depth on every exit path.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(runtime: &'a Runtime) -> Result<Self, Exception> {
        let depth = &runtime.state.depth;
        if depth.get() >= runtime.state.options.max_call_depth {
            return Err(Exception::range_error("Maximum call stack size exceeded"));
        }
        depth.set(depth.get() + 1);
        Ok(Self { depth })
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}
