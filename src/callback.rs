//! Host functions captured by native code.
//!
//! A [`Callback`] is what a native parameter of function type receives. It
//! roots the host function through a [`Persistent`], so the function stays
//! valid after the native call that received it returns. Clones share one
//! root; the root is released when the last clone is dropped.
//!
//! ```
//! use wirebind::prelude::*;
//!
//! let rt = Runtime::new();
//! let add_one = rt.function("addOne", |_, _, args| {
//!     let x = args.first().map(coerce::to_number).unwrap_or(f64::NAN);
//!     Ok(Dynamic::Number(x + 1.0))
//! });
//!
//! let callback = Callback::from_wire(&add_one, &rt).unwrap();
//! assert_eq!(callback.call::<i32>((41,)).unwrap(), 42);
//! ```

use std::fmt;
use std::rc::Rc;

use wirebind_core::{
    ConversionError, Dynamic, FromWire, FunctionRef, NativeError, Persistent, Runtime, ToWire,
};

/// A rooted host function, callable from native code.
#[derive(Clone)]
pub struct Callback {
    persistent: Rc<Persistent>,
}

impl Callback {
    /// Root `function` in `runtime`.
    pub fn new(runtime: &Runtime, function: &FunctionRef) -> Self {
        Self {
            persistent: Rc::new(runtime.persist(function)),
        }
    }

    /// The rooted host function.
    pub fn function(&self) -> &FunctionRef {
        self.persistent.function()
    }

    /// Name of the rooted host function.
    pub fn name(&self) -> &str {
        self.function().name()
    }

    /// Number of clones sharing the root.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.persistent)
    }

    /// Call with `this` undefined, discarding the result.
    pub fn invoke(&self, args: impl IntoWireArgs) -> Result<(), NativeError> {
        self.call::<()>(args)
    }

    /// Call with `this` undefined and decode the result as `R`.
    pub fn call<R: FromWire>(&self, args: impl IntoWireArgs) -> Result<R, NativeError> {
        self.call_with_this(&Dynamic::Undefined, args)
    }

    /// Call with an explicit `this` and decode the result as `R`.
    ///
    /// # Errors
    ///
    /// - [`NativeError::RuntimeDropped`] if the owning runtime is gone
    /// - [`NativeError::Exception`] if the function raised
    /// - [`NativeError::Conversion`] if the result does not decode as `R`
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call_with_this<R: FromWire>(
        &self,
        this: &Dynamic,
        args: impl IntoWireArgs,
    ) -> Result<R, NativeError> {
        let runtime = self
            .persistent
            .owner()
            .upgrade()
            .ok_or(NativeError::RuntimeDropped)?;

        let argv = args.into_wire_args(&runtime);
        tracing::trace!(function = %self.name(), argc = argv.len(), "invoking callback");

        let callee = Dynamic::Function(self.function().clone());
        let result = runtime.call(&callee, this, &argv)?;
        Ok(R::from_wire(&result, &runtime)?)
    }
}

impl FromWire for Callback {
    fn from_wire(value: &Dynamic, runtime: &Runtime) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Function(function) => Ok(Callback::new(runtime, function)),
            other => Err(ConversionError::NotAFunction {
                actual: other.type_name(),
            }),
        }
    }
}

impl ToWire for Callback {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::Function(self.function().clone())
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("function", &self.name())
            .field("ref_count", &self.ref_count())
            .finish()
    }
}

// ============================================================================
// Argument packs
// ============================================================================

/// A pack of native values passed positionally to a host function.
///
/// Implemented for tuples of up to eight [`ToWire`] values and for an
/// already-boxed `Vec<Dynamic>`.
pub trait IntoWireArgs {
    fn into_wire_args(self, runtime: &Runtime) -> Vec<Dynamic>;
}

impl IntoWireArgs for Vec<Dynamic> {
    fn into_wire_args(self, _runtime: &Runtime) -> Vec<Dynamic> {
        self
    }
}

macro_rules! impl_into_wire_args {
    ($($name:ident),*) => {
        impl<$($name: ToWire),*> IntoWireArgs for ($($name,)*) {
            #[allow(non_snake_case, unused_variables)]
            fn into_wire_args(self, runtime: &Runtime) -> Vec<Dynamic> {
                let ($($name,)*) = self;
                vec![$($name.to_wire(runtime)),*]
            }
        }
    };
}

impl_into_wire_args!();
impl_into_wire_args!(A0);
impl_into_wire_args!(A0, A1);
impl_into_wire_args!(A0, A1, A2);
impl_into_wire_args!(A0, A1, A2, A3);
impl_into_wire_args!(A0, A1, A2, A3, A4);
impl_into_wire_args!(A0, A1, A2, A3, A4, A5);
impl_into_wire_args!(A0, A1, A2, A3, A4, A5, A6);
impl_into_wire_args!(A0, A1, A2, A3, A4, A5, A6, A7);

#[cfg(test)]
mod tests {
    use super::*;
    use wirebind_core::{Exception, ExceptionKind, coerce};

    fn add_one(rt: &Runtime) -> Dynamic {
        rt.function("addOne", |_, _, args| {
            let x = args.first().map(coerce::to_number).unwrap_or(f64::NAN);
            Ok(Dynamic::Number(x + 1.0))
        })
    }

    #[test]
    fn call_returns_decoded_result() {
        let rt = Runtime::new();
        let cb = Callback::from_wire(&add_one(&rt), &rt).unwrap();

        assert_eq!(cb.call::<i32>((41,)).unwrap(), 42);
        assert_eq!(cb.call::<f64>((0.5,)).unwrap(), 1.5);
    }

    #[test]
    fn invoke_discards_result() {
        let rt = Runtime::new();
        let cb = Callback::from_wire(&add_one(&rt), &rt).unwrap();
        assert_eq!(cb.invoke((1,)), Ok(()));
    }

    #[test]
    fn arguments_are_boxed_in_order() {
        let rt = Runtime::new();
        let join = rt.function("join", |_, _, args| {
            let parts: Vec<String> = args.iter().map(coerce::to_string).collect();
            Ok(Dynamic::string(parts.join(",")))
        });
        let cb = Callback::from_wire(&join, &rt).unwrap();

        let joined = cb.call::<Dynamic>((1u8, true, "x", -2i32, 1.5f32)).unwrap();
        assert_eq!(joined.as_str(), Some("1,true,x,-2,1.5"));

        let empty = cb.call::<Dynamic>(()).unwrap();
        assert_eq!(empty.as_str(), Some(""));

        let boxed = cb.call::<Dynamic>(vec![Dynamic::Null]).unwrap();
        assert_eq!(boxed.as_str(), Some("null"));
    }

    #[test]
    fn call_with_this() {
        let rt = Runtime::new();
        let get_this = rt.function("getThis", |_, this, _| Ok(this.clone()));
        let cb = Callback::from_wire(&get_this, &rt).unwrap();

        let this = Dynamic::string("receiver");
        let result: Dynamic = cb.call_with_this(&this, ()).unwrap();
        assert_eq!(result, this);
    }

    #[test]
    fn non_function_is_rejected() {
        let rt = Runtime::new();
        let err = Callback::from_wire(&Dynamic::Number(3.0), &rt).unwrap_err();
        assert_eq!(err, ConversionError::NotAFunction { actual: "number" });
        assert_eq!(rt.persistent_stats().created, 0);
    }

    #[test]
    fn host_exception_propagates() {
        let rt = Runtime::new();
        let thrower = rt.function("thrower", |_, _, _| Err(Exception::range_error("nope")));
        let cb = Callback::from_wire(&thrower, &rt).unwrap();

        let err = cb.invoke(()).unwrap_err();
        assert_eq!(err, NativeError::Exception(Exception::range_error("nope")));
        assert_eq!(Exception::from(err).kind, ExceptionKind::RangeError);
    }

    #[test]
    fn clones_share_one_root() {
        let rt = Runtime::new();
        let cb = Callback::from_wire(&add_one(&rt), &rt).unwrap();
        let copy = cb.clone();

        assert_eq!(cb.ref_count(), 2);
        assert_eq!(rt.persistent_stats().live, 1);

        drop(cb);
        assert_eq!(copy.call::<i32>((1,)).unwrap(), 2);
        assert_eq!(rt.persistent_stats().released, 0);

        drop(copy);
        let stats = rt.persistent_stats();
        assert_eq!((stats.live, stats.created, stats.released), (0, 1, 1));
    }

    #[test]
    fn call_after_runtime_dropped() {
        let rt = Runtime::new();
        let cb = Callback::from_wire(&add_one(&rt), &rt).unwrap();
        drop(rt);

        assert_eq!(cb.call::<i32>((1,)), Err(NativeError::RuntimeDropped));
    }

    #[test]
    fn to_wire_returns_same_function() {
        let rt = Runtime::new();
        let f = add_one(&rt);
        let cb = Callback::from_wire(&f, &rt).unwrap();

        assert_eq!(cb.to_wire(&rt), f);
    }
}
