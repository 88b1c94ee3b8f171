//! Generic host value.

use std::fmt;
use std::rc::Rc;

use crate::runtime::{FunctionRef, ObjectHandle};

/// A value in the host runtime's value space.
///
/// The host carries its own dynamic type tag on every value; the native side
/// only decides which native type it expects at a given call site. All
/// numbers are `f64`, so a boxed `u8` and a boxed `f64` look the same to
/// host code.
///
/// Cloning is cheap: strings and functions are reference counted and objects
/// are plain handles into the runtime's instance heap.
#[derive(Clone, Default)]
pub enum Dynamic {
    /// `undefined`
    #[default]
    Undefined,
    /// `null`
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (every numeric kind is a double on the host side)
    Number(f64),
    /// String value
    String(Rc<str>),
    /// Callable function
    Function(FunctionRef),
    /// Object wrapping a native instance
    Object(ObjectHandle),
}

impl Dynamic {
    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Dynamic::String(Rc::from(s.as_ref()))
    }

    /// Get the host-visible name for this value's kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Undefined => "undefined",
            Dynamic::Null => "null",
            Dynamic::Bool(_) => "boolean",
            Dynamic::Number(_) => "number",
            Dynamic::String(_) => "string",
            Dynamic::Function(_) => "function",
            Dynamic::Object(_) => "object",
        }
    }

    /// Check if this value is `undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Dynamic::Undefined)
    }

    /// Check if this value is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    /// Check if this value is `undefined` or `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Dynamic::Undefined | Dynamic::Null)
    }

    /// Get the number payload, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the function payload, if this is a function.
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Dynamic::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Undefined => write!(f, "Undefined"),
            Dynamic::Null => write!(f, "Null"),
            Dynamic::Bool(v) => write!(f, "Bool({})", v),
            Dynamic::Number(v) => write!(f, "Number({})", v),
            Dynamic::String(s) => write!(f, "String({:?})", s),
            Dynamic::Function(func) => write!(f, "Function({:?})", func.name()),
            Dynamic::Object(h) => write!(f, "Object({:?})", h),
        }
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dynamic::Undefined, Dynamic::Undefined) => true,
            (Dynamic::Null, Dynamic::Null) => true,
            (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
            (Dynamic::Number(a), Dynamic::Number(b)) => a == b,
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            // Functions compare by identity
            (Dynamic::Function(a), Dynamic::Function(b)) => a.ptr_eq(b),
            (Dynamic::Object(a), Dynamic::Object(b)) => a == b,
            _ => false,
        }
    }
}
