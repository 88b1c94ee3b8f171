//! Error types for both sides of the call boundary.
//!
//! ```text
//! NativeError (native side, propagated with `?`)
//! ├── ConversionError - a value cannot become the requested native type
//! ├── Exception       - the host raised while native code called into it
//! └── ...             - argument bounds, receiver, dropped runtime, custom
//!
//! Exception (host side, what host code observes)
//! ```
//!
//! Scalar coercion never fails; only unwrapping and callback capture can
//! produce a [`ConversionError`]. Every failure reaching the boundary is
//! turned into an [`Exception`] by `From<NativeError>`.

use std::fmt;

use thiserror::Error;

/// Errors produced by conversion bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value is not an object at all.
    #[error("expected {expected} object, got {actual}")]
    NotAnObject {
        expected: &'static str,
        actual: &'static str,
    },

    /// The object wraps an instance of a different native type.
    #[error("object does not wrap {expected} (wraps {actual})")]
    InstanceTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The handle refers to an instance that has been released.
    #[error("stale handle for {expected}")]
    StaleHandle { expected: &'static str },

    /// A callback was expected but the value is not callable.
    #[error("{actual} is not a function")]
    NotAFunction { actual: &'static str },
}

/// Category of a host exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind {
    Error,
    TypeError,
    RangeError,
}

impl ExceptionKind {
    /// Constructor name the host shows, e.g. `TypeError`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionKind::Error => "Error",
            ExceptionKind::TypeError => "TypeError",
            ExceptionKind::RangeError => "RangeError",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure as the host runtime sees it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Exception {
    pub kind: ExceptionKind,
    pub message: String,
}

impl Exception {
    /// Create an exception of the given kind.
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Plain `Error`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::Error, message)
    }

    /// `TypeError`, raised for values of the wrong kind.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::TypeError, message)
    }

    /// `RangeError`, raised for out-of-range access and runaway recursion.
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::RangeError, message)
    }
}

/// Errors raised on the native side of a call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// Strict slot access past the end of the argument list.
    #[error("argument index {index} out of bounds (count: {count})")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// The receiver of a method call is missing or of the wrong type.
    #[error("invalid this: {message}")]
    InvalidThis { message: String },

    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// The host raised while native code was calling into it.
    #[error("{0}")]
    Exception(#[from] Exception),

    /// A callback outlived the runtime that created it.
    #[error("runtime has been dropped")]
    RuntimeDropped,

    #[error("{0}")]
    Custom(String),
}

impl NativeError {
    pub fn invalid_this(message: impl Into<String>) -> Self {
        NativeError::InvalidThis {
            message: message.into(),
        }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        NativeError::Custom(message.into())
    }
}

impl From<NativeError> for Exception {
    fn from(err: NativeError) -> Self {
        match err {
            NativeError::Exception(e) => e,
            NativeError::Conversion(e) => Exception::type_error(e.to_string()),
            NativeError::InvalidThis { .. } => Exception::type_error(err.to_string()),
            NativeError::ArgumentIndexOutOfBounds { .. } => Exception::range_error(err.to_string()),
            NativeError::RuntimeDropped | NativeError::Custom(_) => {
                Exception::error(err.to_string())
            }
        }
    }
}
