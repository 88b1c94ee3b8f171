//! Deterministic hash-based identity for native functions.
//!
//! Uses XXHash64 mixed with a domain constant, so the same name always maps
//! to the same hash regardless of registration order.

use std::fmt;

use xxhash_rust::xxh64::xxh64;

/// Domain marker for name hashes.
const NAME_DOMAIN: u64 = 0x2fac10b63a6cc57c;

/// A deterministic 64-bit hash identifying a native function.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Create a hash from a name.
    ///
    /// ```
    /// use wirebind_core::TypeHash;
    ///
    /// assert_eq!(TypeHash::from_name("add"), TypeHash::from_name("add"));
    /// assert_ne!(TypeHash::from_name("add"), TypeHash::from_name("sub"));
    /// ```
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(NAME_DOMAIN ^ xxh64(name.as_bytes(), 0))
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism() {
        assert_eq!(TypeHash::from_name("point"), TypeHash::from_name("point"));
    }

    #[test]
    fn uniqueness() {
        assert_ne!(TypeHash::from_name("u32"), TypeHash::from_name("i32"));
        assert_ne!(TypeHash::from_name("a"), TypeHash::from_name("b"));
    }

    #[test]
    fn formatting() {
        let hash = TypeHash::from_name("int");
        assert!(format!("{}", hash).starts_with("0x"));
        assert!(format!("{:?}", hash).starts_with("TypeHash(0x"));
        assert_eq!(format!("{}", hash).len(), 18);
    }
}
