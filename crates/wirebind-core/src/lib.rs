//! Core types for the wirebind marshalling layer.
//!
//! This crate holds everything the call boundary is built from:
//!
//! - [`Dynamic`]: the host runtime's generic value
//! - [`coerce`]: the host's own scalar coercion rules
//! - [`FromWire`] / [`ToWire`]: per-type conversion bindings, selected at compile time
//! - [`Runtime`]: a minimal host runtime (functions, wrapped instances, persistent handles)
//! - [`NativeError`] / [`Exception`]: failures on either side of the boundary
//!
//! The `wirebind` crate builds argument extraction, callbacks and native
//! function dispatch on top of these.

pub mod coerce;
mod convert;
mod error;
pub mod runtime;
mod type_hash;
mod value;

pub use convert::{FromWire, IntoReturn, ToWire};
pub use error::{ConversionError, Exception, ExceptionKind, NativeError};
pub use runtime::{
    FunctionRef, ObjectHandle, Persistent, PersistentStats, Runtime, RuntimeOptions, WeakRuntime,
};
pub use type_hash::TypeHash;
pub use value::Dynamic;
