//! Typed marshalling between a dynamic host runtime and native Rust functions.
//!
//! The host side speaks [`Dynamic`] values; the native side speaks ordinary
//! Rust types. This crate sits in between:
//!
//! - [`FromArg`] extracts one native parameter from a host argument, using
//!   the type's [`FromWire`] binding or a string wrapper ([`CStrArg`],
//!   [`UCStrArg`], [`StrArg`])
//! - [`NativeFn`] adapts a typed function into something the host can call
//! - [`Callback`] lets native code hold on to a host function and call it
//!   later
//! - [`Wrapped`] recovers a native instance from the host object wrapping it
//!
//! ```
//! use wirebind::prelude::*;
//!
//! let rt = Runtime::new();
//!
//! // Native code receiving a host callback and a string
//! let apply = NativeFn::wrap("apply", |cb: Callback, s: CStrArg| {
//!     cb.call::<u32>((s.len() as u32,))
//! })
//! .into_function(&rt);
//!
//! let double = rt.function("double", |_, _, args| {
//!     Ok(Dynamic::Number(coerce::to_number(&args[0]) * 2.0))
//! });
//!
//! let result = rt
//!     .call(&apply, &Dynamic::Undefined, &[double, Dynamic::string("abc")])
//!     .unwrap();
//! assert_eq!(result, Dynamic::Number(6.0));
//! ```

mod args;
mod callback;
mod instance;
mod native_fn;

pub use args::{Arguments, CStrArg, FromArg, StrArg, UCStrArg};
pub use callback::{Callback, IntoWireArgs};
pub use instance::{Wrapped, unwrap_instance};
pub use native_fn::{CallContext, IntoNativeFn, NativeCallable, NativeFn};

pub use wirebind_core::{
    ConversionError, Dynamic, Exception, ExceptionKind, FromWire, FunctionRef, IntoReturn,
    NativeError, ObjectHandle, Persistent, PersistentStats, Runtime, RuntimeOptions, ToWire,
    TypeHash, WeakRuntime, coerce,
};

pub mod prelude {
    pub use crate::{
        Arguments, CStrArg, CallContext, Callback, Dynamic, Exception, ExceptionKind, FromArg,
        FromWire, IntoReturn, NativeError, NativeFn, Runtime, RuntimeOptions, StrArg, ToWire,
        UCStrArg, Wrapped, coerce, unwrap_instance,
    };
}
