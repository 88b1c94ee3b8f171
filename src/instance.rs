//! Native instances wrapped in host objects.
//!
//! [`Runtime::wrap`] moves a native value into the instance heap and hands
//! back an object. [`unwrap_instance`] goes the other way: it checks that an
//! object wraps a live instance of the requested type and returns a
//! [`Wrapped`] sharing it.

use std::any::{Any, type_name};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use wirebind_core::{
    ConversionError, Dynamic, FromWire, NativeError, ObjectHandle, Runtime, ToWire,
};

/// A native instance recovered from a host object.
///
/// Holds a strong reference, so the instance stays alive while the
/// `Wrapped` does even if the host releases the object.
pub struct Wrapped<T> {
    handle: ObjectHandle,
    instance: Rc<RefCell<T>>,
}

impl<T: Any> Wrapped<T> {
    /// Host object this instance was recovered from.
    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// # Panics
    ///
    /// If the instance is mutably borrowed, e.g. by an outer native call
    /// further up the stack.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.instance.borrow()
    }

    /// # Panics
    ///
    /// If the instance is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.instance.borrow_mut()
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, T>, NativeError> {
        self.instance
            .try_borrow()
            .map_err(|_| NativeError::custom(format!("{} is mutably borrowed", type_name::<T>())))
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, T>, NativeError> {
        self.instance
            .try_borrow_mut()
            .map_err(|_| NativeError::custom(format!("{} is already borrowed", type_name::<T>())))
    }

    pub fn ptr_eq(&self, other: &Wrapped<T>) -> bool {
        Rc::ptr_eq(&self.instance, &other.instance)
    }
}

impl<T> Clone for Wrapped<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle,
            instance: Rc::clone(&self.instance),
        }
    }
}

impl<T> fmt::Debug for Wrapped<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapped")
            .field("type", &type_name::<T>())
            .field("handle", &self.handle)
            .finish()
    }
}

/// Recover the native `T` wrapped by `value`.
///
/// # Errors
///
/// - [`ConversionError::NotAnObject`] if `value` is not an object
/// - [`ConversionError::InstanceTypeMismatch`] if it wraps another type
/// - [`ConversionError::StaleHandle`] if the instance has been released
pub fn unwrap_instance<T: Any>(
    value: &Dynamic,
    runtime: &Runtime,
) -> Result<Wrapped<T>, ConversionError> {
    let Dynamic::Object(handle) = value else {
        return Err(ConversionError::NotAnObject {
            expected: type_name::<T>(),
            actual: value.type_name(),
        });
    };

    let instance = runtime.resolve::<T>(*handle).inspect_err(|err| {
        tracing::debug!(error = %err, "failed to unwrap instance");
    })?;

    Ok(Wrapped {
        handle: *handle,
        instance,
    })
}

impl<T: Any> FromWire for Wrapped<T> {
    fn from_wire(value: &Dynamic, runtime: &Runtime) -> Result<Self, ConversionError> {
        unwrap_instance(value, runtime)
    }
}

impl<T: Any> ToWire for Wrapped<T> {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::Object(self.handle)
    }
}
