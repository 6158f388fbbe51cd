//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] identifies a type by its fully qualified name, so a reference
//! to a class can be formed before the class itself has been built. Derived
//! types (arrays, by-reference types) and member signatures mix the hashes of
//! their components with domain constants so they never collide with a plain
//! type name.
//!
//! ```
//! use classbind_core::TypeHash;
//!
//! let a = TypeHash::from_name("System.Object");
//! assert_eq!(a, TypeHash::from_name("System.Object"));
//! assert_ne!(TypeHash::array_of(a), a);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants.
pub mod hash_constants {
    /// Separator constant used when folding a sequence of hashes.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for named types.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for single-dimension arrays.
    pub const ARRAY: u64 = 0x6a09e667f3bcc908;

    /// Domain marker for by-reference types.
    pub const BYREF: u64 = 0x3c6ef372fe94f82b;

    /// Domain marker for parameter lists.
    pub const PARAMS: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for members.
    pub const MEMBER: u64 = 0x7d3c8b4a92e15f6d;

    /// Per-position markers so that parameter order matters.
    pub const PARAM_MARKERS: [u64; 8] = [
        0x9e3779b97f4a7c15,
        0xbf58476d1ce4e5b9,
        0x94d049bb133111eb,
        0xd6e8feb86659fd93,
        0xe7037ed1a0b428db,
        0xc6a4a7935bd1e995,
        0x8648dbbc94d49b8d,
        0xa2b48b2c69e0d657,
    ];
}

/// A deterministic 64-bit identity for a type, parameter list or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a fully qualified type name (`Namespace.Outer.Inner`).
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a single-dimension array of `element`.
    #[inline]
    pub fn array_of(element: TypeHash) -> Self {
        TypeHash(
            hash_constants::ARRAY
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(element.0),
        )
    }

    /// Hash of a by-reference `inner` type.
    #[inline]
    pub fn by_ref(inner: TypeHash) -> Self {
        TypeHash(
            hash_constants::BYREF
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(inner.0),
        )
    }

    /// Hash of an ordered parameter type list.
    ///
    /// `(int, string)` and `(string, int)` hash differently.
    pub fn from_params(params: &[TypeHash]) -> Self {
        TypeHash(fold_params(hash_constants::PARAMS, params))
    }

    /// Hash of a member identified by owner, name and parameter types.
    pub fn from_member(owner: TypeHash, name: &str, params: &[TypeHash]) -> Self {
        let seed = hash_constants::MEMBER ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        TypeHash(fold_params(seed, params))
    }

    /// Whether this is the empty hash.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

fn fold_params(seed: u64, params: &[TypeHash]) -> u64 {
    let mut hash = seed;
    for (i, param) in params.iter().enumerate() {
        let marker = hash_constants::PARAM_MARKERS
            .get(i)
            .copied()
            .unwrap_or_else(|| hash_constants::PARAM_MARKERS[0].wrapping_add(i as u64));
        hash = hash
            .wrapping_mul(hash_constants::SEP)
            .wrapping_add(marker ^ param.0);
    }
    hash
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
