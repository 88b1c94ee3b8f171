//! Native functions exposed to the host.
//!
//! A [`NativeFn`] is the unit the host calls: it receives a [`CallContext`]
//! holding the arguments, the receiver and the return slot. Typed Rust
//! functions and closures are adapted into that shape by [`IntoNativeFn`],
//! which extracts each parameter with [`FromArg`] and boxes the return value
//! with [`IntoReturn`].
//!
//! # Example
//!
//! ```
//! use wirebind::prelude::*;
//!
//! let rt = Runtime::new();
//! let add = NativeFn::wrap("add", |a: i32, b: i32| a + b).into_function(&rt);
//!
//! let sum = rt
//!     .call(&add, &Dynamic::Undefined, &[Dynamic::Number(2.0), Dynamic::string("40")])
//!     .unwrap();
//! assert_eq!(sum, Dynamic::Number(42.0));
//! ```

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use wirebind_core::{Dynamic, Exception, IntoReturn, NativeError, Runtime, ToWire, TypeHash};

use crate::args::{Arguments, FromArg};
use crate::instance::{Wrapped, unwrap_instance};

/// Context for a single native call.
pub struct CallContext<'a> {
    args: Arguments<'a>,
    this: &'a Dynamic,
    return_slot: &'a mut Dynamic,
}

impl<'a> CallContext<'a> {
    pub fn new(args: Arguments<'a>, this: &'a Dynamic, return_slot: &'a mut Dynamic) -> Self {
        Self {
            args,
            this,
            return_slot,
        }
    }

    pub fn args(&self) -> &Arguments<'a> {
        &self.args
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Raw argument, failing past the end.
    pub fn arg_slot(&self, index: usize) -> Result<&'a Dynamic, NativeError> {
        self.args.slot(index)
    }

    /// Extract argument `index` as a native parameter.
    pub fn arg<T: FromArg>(&self, index: usize) -> Result<T, NativeError> {
        T::from_arg(&self.args, index)
    }

    pub fn this_value(&self) -> &'a Dynamic {
        self.this
    }

    /// Unwrap the receiver as a native instance.
    pub fn this<T: Any>(&self) -> Result<Wrapped<T>, NativeError> {
        unwrap_instance(self.this, self.args.runtime())
            .map_err(|err| NativeError::invalid_this(err.to_string()))
    }

    /// Box a native value into the return slot.
    pub fn set_return<T: ToWire>(&mut self, value: T) {
        let runtime = self.args.runtime();
        *self.return_slot = value.to_wire(runtime);
    }

    pub fn set_return_slot(&mut self, value: Dynamic) {
        *self.return_slot = value;
    }

    pub fn runtime(&self) -> &'a Runtime {
        self.args.runtime()
    }
}

/// Something the host can call natively.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        self(ctx)
    }
}

/// A named native function.
#[derive(Clone)]
pub struct NativeFn {
    /// Hash of the function name
    pub id: TypeHash,
    name: Rc<str>,
    inner: Rc<dyn NativeCallable>,
}

impl NativeFn {
    /// Create from a closure working on the raw call context.
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), NativeError> + 'static,
    {
        Self::from_callable(name, f)
    }

    pub fn from_callable<C: NativeCallable + 'static>(name: &str, callable: C) -> Self {
        Self {
            id: TypeHash::from_name(name),
            name: Rc::from(name),
            inner: Rc::new(callable),
        }
    }

    /// Adapt a typed function or closure.
    pub fn wrap<F, Args, R>(name: &str, f: F) -> Self
    where
        F: IntoNativeFn<Args, R>,
    {
        f.into_native_fn(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }

    /// Expose as a host function value.
    pub fn into_function(self, runtime: &Runtime) -> Dynamic {
        let name = self.name.to_string();
        runtime.function(name, move |rt, this, args| self.dispatch(rt, this, args))
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn dispatch(
        &self,
        runtime: &Runtime,
        this: &Dynamic,
        args: &[Dynamic],
    ) -> Result<Dynamic, Exception> {
        tracing::trace!(function = %self.name, argc = args.len(), "native call");

        let mut ret = Dynamic::Undefined;
        let mut ctx = CallContext::new(Arguments::new(args, runtime), this, &mut ret);
        if let Err(err) = self.call(&mut ctx) {
            tracing::debug!(function = %self.name, error = %err, "native call failed");
            return Err(err.into());
        }
        Ok(ret)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Conversion of a typed function into a [`NativeFn`].
///
/// `Args` is the tuple of parameter types; it only exists to keep the impls
/// for different arities apart.
pub trait IntoNativeFn<Args, R> {
    fn into_native_fn(self, name: &str) -> NativeFn;
}

macro_rules! impl_into_native_fn {
    ($($arg:ident $val:ident $idx:tt),*) => {
        impl<F, R, $($arg),*> IntoNativeFn<($($arg,)*), R> for F
        where
            F: Fn($($arg),*) -> R + 'static,
            R: IntoReturn,
            $($arg: FromArg,)*
        {
            fn into_native_fn(self, name: &str) -> NativeFn {
                NativeFn::new(name, move |ctx: &mut CallContext<'_>| {
                    // Every parameter is extracted before the body runs
                    $(let $val = <$arg as FromArg>::from_arg(ctx.args(), $idx)?;)*
                    let value = (self)($($val),*).into_return(ctx.runtime())?;
                    ctx.set_return_slot(value);
                    Ok(())
                })
            }
        }
    };
}

impl_into_native_fn!();
impl_into_native_fn!(A0 a0 0);
impl_into_native_fn!(A0 a0 0, A1 a1 1);
impl_into_native_fn!(A0 a0 0, A1 a1 1, A2 a2 2);
impl_into_native_fn!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
impl_into_native_fn!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4);
impl_into_native_fn!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5);
impl_into_native_fn!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6);
impl_into_native_fn!(A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4, A5 a5 5, A6 a6 6, A7 a7 7);
