//! Hash function boundary for Bloom filters.
//!
//! A filter never inspects its elements; it only sees the 64-bit value a
//! [`BloomHash`] produces for them. The hash also declares, at compile time,
//! whether its output is already well mixed. When it is not, the filter's
//! [`HashAdapter`] runs a finalizer over the value before deriving positions.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── adapter.rs  - HashAdapter and the mix64 finalizer
//! ├── hasher.rs   - Fnv1a, StdBuildHash, FnHash, Avalanching
//! ├── xxhash.rs   - XxHash3 (default)
//! └── mod.rs      - This file (BloomHash trait)
//! ```
//!
//! # Choosing a Hash Function
//!
//! | Hash                | Avalanching | Use Case                                  |
//! |---------------------|-------------|-------------------------------------------|
//! | [`XxHash3`]         | yes         | Default; fast, high quality, seedable     |
//! | [`Fnv1a`]           | no          | Tiny keys, no dependencies on layout      |
//! | [`StdBuildHash`]    | no          | Reuse an existing `BuildHasher`           |
//! | [`FnHash`]          | no          | Custom hash closure                       |
//! | [`Avalanching`]     | yes         | Vouch for a custom hash's mixing quality  |
//!
//! # Examples
//!
//! ```
//! use blockbloom::hash::{BloomHash, FnHash, HashAdapter, XxHash3};
//!
//! let xx = XxHash3::new();
//! assert_eq!(xx.hash_one("hello"), xx.hash_one("hello"));
//!
//! // Identity hash on integers: not avalanching, so the adapter mixes it
//! let identity = HashAdapter::new(FnHash::new(|x: &u64| *x));
//! assert_ne!(identity.hash(&1u64), 1);
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod adapter;
pub mod hasher;
pub mod xxhash;

pub use adapter::{mix64, HashAdapter};
pub use hasher::{Avalanching, FnHash, Fnv1a, StdBuildHash};
pub use xxhash::XxHash3;

/// Hash used by filters that do not name one.
pub type DefaultHash = XxHash3;

/// A hash function over elements of type `T`.
///
/// Implementations must be deterministic: the same value always hashes to the
/// same `u64` for a given hash instance. Insertion and lookup rely on it.
///
/// # Avalanching
///
/// Set [`IS_AVALANCHING`](Self::IS_AVALANCHING) to `true` only when every
/// output bit depends on every input bit with probability close to one half.
/// Integer identity hashes and most `std` hashers over short keys do not
/// qualify; leaving the flag `false` costs one extra multiply-xor cascade per
/// operation.
///
/// # Examples
///
/// ```
/// use blockbloom::hash::BloomHash;
///
/// struct Modulo;
///
/// impl BloomHash<u32> for Modulo {
///     fn hash_one(&self, item: &u32) -> u64 {
///         u64::from(*item % 1024)
///     }
/// }
///
/// assert!(!<Modulo as BloomHash<u32>>::IS_AVALANCHING);
/// assert_eq!(Modulo.hash_one(&1025), 1);
/// ```
pub trait BloomHash<T: ?Sized> {
    /// Whether the output is already well mixed.
    const IS_AVALANCHING: bool = false;

    /// Hash one element.
    fn hash_one(&self, item: &T) -> u64;
}

impl<T: ?Sized, H: BloomHash<T> + ?Sized> BloomHash<T> for &H {
    const IS_AVALANCHING: bool = H::IS_AVALANCHING;

    #[inline]
    fn hash_one(&self, item: &T) -> u64 {
        (**self).hash_one(item)
    }
}
