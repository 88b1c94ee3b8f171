//! Per-parameter argument extraction.
//!
//! A native parameter is produced from one positional host argument by a
//! type implementing [`FromArg`]. Most types go through their
//! [`FromWire`] binding and need nothing else. Strings need somewhere to put
//! the decoded bytes, so they get wrapper types that own the buffer:
//!
//! | Wrapper | Native view | Equivalent C parameter |
//! |---------|-------------|------------------------|
//! | [`CStrArg`] | `&CStr` | `const char *` |
//! | [`UCStrArg`] | `&[u8]` | `const unsigned char *` |
//! | [`StrArg`] | `&str` | - |
//!
//! The dispatcher moves each wrapper into the native call, so its buffer is
//! dropped when that call returns, whichever way it returns.

use std::ffi::{CStr, c_char};
use std::fmt;

use wirebind_core::{ConversionError, Dynamic, FromWire, NativeError, Runtime, coerce};

const UNDEFINED: &Dynamic = &Dynamic::Undefined;

/// Borrowed view of a host call's positional arguments.
#[derive(Clone, Copy)]
pub struct Arguments<'a> {
    values: &'a [Dynamic],
    runtime: &'a Runtime,
}

impl<'a> Arguments<'a> {
    /// View `values` as the arguments of a call in `runtime`.
    pub fn new(values: &'a [Dynamic], runtime: &'a Runtime) -> Self {
        Self { values, runtime }
    }

    /// Number of arguments actually passed.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the call passed no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get an argument. Positions past the end read as `undefined`, as the
    /// host would pass them.
    pub fn get(&self, index: usize) -> &'a Dynamic {
        self.values.get(index).unwrap_or(UNDEFINED)
    }

    /// Get an argument, failing past the end.
    pub fn slot(&self, index: usize) -> Result<&'a Dynamic, NativeError> {
        self.values
            .get(index)
            .ok_or(NativeError::ArgumentIndexOutOfBounds {
                index,
                count: self.values.len(),
            })
    }

    /// Decode an argument through its conversion binding.
    pub fn decode<T: FromWire>(&self, index: usize) -> Result<T, ConversionError> {
        T::from_wire(self.get(index), self.runtime)
    }

    /// Runtime the call is running in.
    pub fn runtime(&self) -> &'a Runtime {
        self.runtime
    }

    /// Iterate over the passed arguments.
    pub fn iter(&self) -> std::slice::Iter<'a, Dynamic> {
        self.values.iter()
    }

    /// The passed arguments as a slice.
    pub fn as_slice(&self) -> &'a [Dynamic] {
        self.values
    }
}

impl fmt::Debug for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values).finish()
    }
}

/// Construct a native parameter from argument `index` of a host call.
pub trait FromArg: Sized {
    fn from_arg(args: &Arguments<'_>, index: usize) -> Result<Self, NativeError>;
}

/// Default case: the value produced by the type's binding is the parameter.
impl<T: FromWire> FromArg for T {
    fn from_arg(args: &Arguments<'_>, index: usize) -> Result<Self, NativeError> {
        args.decode(index).map_err(NativeError::from)
    }
}

// ============================================================================
// String wrappers
// ============================================================================

/// Host string form of an argument, NUL-terminated.
struct Utf8Buffer {
    bytes: Vec<u8>,
}

impl Utf8Buffer {
    fn decode(args: &Arguments<'_>, index: usize) -> Self {
        let mut bytes = coerce::to_string(args.get(index)).into_bytes();
        bytes.push(0);
        Self { bytes }
    }

    /// C view: stops at the first NUL, which may be inside the text.
    fn as_cstr(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.bytes).unwrap_or_default()
    }

    /// Decoded bytes without the terminator.
    fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 1]
    }

    fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes
    }
}

/// `const char *` parameter: the argument's string form in an owned buffer.
pub struct CStrArg {
    buffer: Utf8Buffer,
}

impl CStrArg {
    /// C string view, up to the first NUL.
    pub fn get(&self) -> &CStr {
        self.buffer.as_cstr()
    }

    /// Pointer to the buffer, valid while `self` is alive.
    pub fn as_ptr(&self) -> *const c_char {
        self.buffer.bytes.as_ptr().cast()
    }

    /// Full decoded bytes, without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.buffer.as_bytes_with_nul()
    }

    /// Byte length of the decoded string, excluding the terminator.
    pub fn len(&self) -> usize {
        self.buffer.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromArg for CStrArg {
    fn from_arg(args: &Arguments<'_>, index: usize) -> Result<Self, NativeError> {
        Ok(Self {
            buffer: Utf8Buffer::decode(args, index),
        })
    }
}

impl fmt::Debug for CStrArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CStrArg").field(&self.get()).finish()
    }
}

/// `const unsigned char *` parameter.
///
/// Same decode and buffer as [`CStrArg`]; only the view is unsigned.
pub struct UCStrArg {
    buffer: Utf8Buffer,
}

impl UCStrArg {
    /// Bytes up to the first NUL.
    pub fn get(&self) -> &[u8] {
        self.buffer.as_cstr().to_bytes()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.buffer.bytes.as_ptr()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn as_bytes_with_nul(&self) -> &[u8] {
        self.buffer.as_bytes_with_nul()
    }

    pub fn len(&self) -> usize {
        self.buffer.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromArg for UCStrArg {
    fn from_arg(args: &Arguments<'_>, index: usize) -> Result<Self, NativeError> {
        Ok(Self {
            buffer: Utf8Buffer::decode(args, index),
        })
    }
}

impl fmt::Debug for UCStrArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UCStrArg").field(&self.get()).finish()
    }
}

/// `&str` parameter: the argument's string form, owned for the call.
#[derive(Debug)]
pub struct StrArg {
    text: String,
}

impl StrArg {
    pub fn get(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl FromArg for StrArg {
    fn from_arg(args: &Arguments<'_>, index: usize) -> Result<Self, NativeError> {
        Ok(Self {
            text: coerce::to_string(args.get(index)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebind_core::ToWire;

    #[test]
    fn arguments_bounds() {
        let rt = Runtime::new();
        let values = [Dynamic::Number(1.0)];
        let args = Arguments::new(&values, &rt);

        assert_eq!(args.len(), 1);
        assert!(args.get(1).is_undefined());
        assert_eq!(
            args.slot(4),
            Err(NativeError::ArgumentIndexOutOfBounds { index: 4, count: 1 })
        );
    }

    #[test]
    fn missing_arguments_decode_as_undefined() {
        let rt = Runtime::new();
        let args = Arguments::new(&[], &rt);

        assert_eq!(i32::from_arg(&args, 0).unwrap(), 0);
        assert!(!bool::from_arg(&args, 0).unwrap());
        assert!(f64::from_arg(&args, 2).unwrap().is_nan());
        assert_eq!(CStrArg::from_arg(&args, 0).unwrap().get(), c"undefined");
    }

    #[test]
    fn default_case_uses_binding() {
        let rt = Runtime::new();
        let values = [Dynamic::Number(300.0), Dynamic::string("7")];
        let args = Arguments::new(&values, &rt);

        assert_eq!(u8::from_arg(&args, 0).unwrap(), 44);
        assert_eq!(i32::from_arg(&args, 1).unwrap(), 7);
    }

    #[test]
    fn cstr_roundtrip() {
        let rt = Runtime::new();
        let values = [c"abc".to_wire(&rt)];
        let args = Arguments::new(&values, &rt);

        let arg = CStrArg::from_arg(&args, 0).unwrap();
        assert_eq!(arg.get(), c"abc");
        assert_eq!(arg.len(), 3);
        assert_eq!(arg.as_bytes_with_nul(), b"abc\0");
    }

    #[test]
    fn cstr_decodes_any_value() {
        let rt = Runtime::new();
        let values = [Dynamic::Number(1.5), Dynamic::Bool(true), Dynamic::Null];
        let args = Arguments::new(&values, &rt);

        assert_eq!(CStrArg::from_arg(&args, 0).unwrap().get(), c"1.5");
        assert_eq!(CStrArg::from_arg(&args, 1).unwrap().get(), c"true");
        assert_eq!(CStrArg::from_arg(&args, 2).unwrap().get(), c"null");
    }

    #[test]
    fn interior_nul_truncates_c_view_only() {
        let rt = Runtime::new();
        let values = [Dynamic::string("ab\0cd")];
        let args = Arguments::new(&values, &rt);

        let arg = CStrArg::from_arg(&args, 0).unwrap();
        assert_eq!(arg.get(), c"ab");
        assert_eq!(arg.as_bytes(), b"ab\0cd");
        assert_eq!(arg.len(), 5);
    }

    #[test]
    fn unsigned_view_aliases_same_bytes() {
        let rt = Runtime::new();
        let values = [Dynamic::string("h\u{e9}llo")];
        let args = Arguments::new(&values, &rt);

        let signed = CStrArg::from_arg(&args, 0).unwrap();
        let unsigned = UCStrArg::from_arg(&args, 0).unwrap();

        assert_eq!(signed.as_bytes_with_nul(), unsigned.as_bytes_with_nul());
        assert_eq!(signed.get().to_bytes(), unsigned.get());
        assert_eq!(unsigned.len(), 6);

        // SAFETY: both pointers come from live buffers of `len() + 1` bytes.
        let (a, b) = unsafe {
            (
                std::slice::from_raw_parts(signed.as_ptr().cast::<u8>(), signed.len() + 1),
                std::slice::from_raw_parts(unsigned.as_ptr(), unsigned.len() + 1),
            )
        };
        assert_eq!(a, b);
    }

    #[test]
    fn str_arg() {
        let rt = Runtime::new();
        let values = [Dynamic::string("hello")];
        let args = Arguments::new(&values, &rt);

        let arg = StrArg::from_arg(&args, 0).unwrap();
        assert_eq!(arg.get(), "hello");
        assert_eq!(arg.into_string(), "hello");
    }

    #[test]
    fn debug_output() {
        let rt = Runtime::new();
        let values = [Dynamic::string("x")];
        let args = Arguments::new(&values, &rt);

        assert_eq!(format!("{:?}", args), "[String(\"x\")]");
        assert!(format!("{:?}", CStrArg::from_arg(&args, 0).unwrap()).contains("CStrArg"));
    }
}
