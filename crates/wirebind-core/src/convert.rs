//! Conversion bindings between native types and [`Dynamic`].
//!
//! Each supported native type implements:
//! - [`FromWire`]: decode a host value into the native type
//! - [`ToWire`]: box a native value into a host value
//!
//! The binding is chosen by the static type at the call site. Using a type
//! with no binding is a compile error, not a runtime failure:
//!
//! ```compile_fail
//! use wirebind_core::{Dynamic, FromWire, Runtime};
//!
//! struct Unbound;
//!
//! let rt = Runtime::new();
//! let _ = Unbound::from_wire(&Dynamic::Undefined, &rt);
//! ```
//!
//! ## Supported Types
//!
//! - Integers: `i8`, `i16`, `i32`, `u8`, `u16`, `u32` through the host's
//!   32-bit coercions, truncated to width; `i64`, `u64` through number coercion
//! - Floats: `f32`, `f64`
//! - Boolean: `bool`
//! - Unit: `()` (void)
//! - Strings (to the host only): `&CStr`, `&[u8]`, `&str`, `String`
//! - `Option<T>`, `Dynamic`, `ObjectHandle`
//!
//! ## Example
//!
//! ```
//! use wirebind_core::{FromWire, Runtime, ToWire};
//!
//! let rt = Runtime::new();
//! let boxed = 300u32.to_wire(&rt);
//! assert_eq!(u8::from_wire(&boxed, &rt).unwrap(), 44);
//! ```

use std::ffi::CStr;

use crate::coerce;
use crate::{ConversionError, Dynamic, NativeError, ObjectHandle, Runtime};

/// Decode a host value into a native type.
///
/// Scalar bindings are permissive: they apply the host's own coercion and
/// never fail. Only bindings that need a specific kind of value (wrapped
/// instances, callbacks) return errors.
pub trait FromWire: Sized {
    /// Decode `value` as `Self`.
    fn from_wire(value: &Dynamic, runtime: &Runtime) -> Result<Self, ConversionError>;
}

/// Box a native value into a host value.
pub trait ToWire {
    /// Box `self` as a host value.
    fn to_wire(self, runtime: &Runtime) -> Dynamic;
}

/// Produce the host value for a native function's return.
///
/// Implemented for every [`ToWire`] type and for `Result<T, NativeError>`,
/// so a native function may return either a plain value or a fallible one.
pub trait IntoReturn {
    /// Convert into the host return value, or the error to raise.
    fn into_return(self, runtime: &Runtime) -> Result<Dynamic, NativeError>;
}

impl<T: ToWire> IntoReturn for T {
    fn into_return(self, runtime: &Runtime) -> Result<Dynamic, NativeError> {
        Ok(self.to_wire(runtime))
    }
}

impl<T: ToWire> IntoReturn for Result<T, NativeError> {
    fn into_return(self, runtime: &Runtime) -> Result<Dynamic, NativeError> {
        self.map(|value| value.to_wire(runtime))
    }
}

// ============================================================================
// Numeric implementations
// ============================================================================

macro_rules! impl_wire_int {
    ($coerce:path => $($ty:ty),*) => {
        $(
            impl FromWire for $ty {
                fn from_wire(value: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
                    // Narrow widths truncate, no range check
                    Ok($coerce(value) as $ty)
                }
            }

            impl ToWire for $ty {
                fn to_wire(self, _runtime: &Runtime) -> Dynamic {
                    Dynamic::Number(self as f64)
                }
            }
        )*
    };
}

impl_wire_int!(coerce::to_uint32 => u8, u16, u32);
impl_wire_int!(coerce::to_int32 => i8, i16, i32);

// 64-bit widths have no host coercion of their own; the float cast
// saturates and maps NaN to zero.
impl_wire_int!(coerce::to_number => i64, u64);

impl FromWire for f64 {
    fn from_wire(value: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        Ok(coerce::to_number(value))
    }
}

impl ToWire for f64 {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::Number(self)
    }
}

impl FromWire for f32 {
    fn from_wire(value: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        Ok(coerce::to_number(value) as f32)
    }
}

impl ToWire for f32 {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::Number(self as f64)
    }
}

// ============================================================================
// Bool and unit
// ============================================================================

impl FromWire for bool {
    fn from_wire(value: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        Ok(coerce::to_boolean(value))
    }
}

impl ToWire for bool {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::Bool(self)
    }
}

/// Void: decoding ignores the value, boxing yields `undefined`.
impl FromWire for () {
    fn from_wire(_value: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        Ok(())
    }
}

impl ToWire for () {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::Undefined
    }
}

// ============================================================================
// Strings (native to host only; decoding goes through argument extractors)
// ============================================================================

impl ToWire for &CStr {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::string(String::from_utf8_lossy(self.to_bytes()))
    }
}

/// Treated as a NUL-terminated buffer: bytes after the first NUL are ignored.
impl ToWire for &[u8] {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        let end = self.iter().position(|&b| b == 0).unwrap_or(self.len());
        Dynamic::string(String::from_utf8_lossy(&self[..end]))
    }
}

impl ToWire for &str {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::string(self)
    }
}

impl ToWire for String {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::string(self)
    }
}

// ============================================================================
// Host values, handles and options
// ============================================================================

impl FromWire for Dynamic {
    fn from_wire(value: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl ToWire for Dynamic {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        self
    }
}

impl FromWire for ObjectHandle {
    fn from_wire(value: &Dynamic, _runtime: &Runtime) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Object(handle) => Ok(*handle),
            other => Err(ConversionError::NotAnObject {
                expected: "wrapped",
                actual: other.type_name(),
            }),
        }
    }
}

impl ToWire for ObjectHandle {
    fn to_wire(self, _runtime: &Runtime) -> Dynamic {
        Dynamic::Object(self)
    }
}

/// `undefined` and `null` decode to `None`; `None` boxes to `null`.
impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(value: &Dynamic, runtime: &Runtime) -> Result<Self, ConversionError> {
        if value.is_nullish() {
            Ok(None)
        } else {
            T::from_wire(value, runtime).map(Some)
        }
    }
}

impl<T: ToWire> ToWire for Option<T> {
    fn to_wire(self, runtime: &Runtime) -> Dynamic {
        match self {
            Some(value) => value.to_wire(runtime),
            None => Dynamic::Null,
        }
    }
}
