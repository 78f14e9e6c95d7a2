//! Non-default hash functions and hash wrappers.
//!
//! - [`Fnv1a`]: deterministic FNV-1a over an element's [`Hash`] byte stream
//! - [`StdBuildHash`]: any [`BuildHasher`] (e.g. `RandomState`)
//! - [`FnHash`]: a closure `Fn(&T) -> u64`
//! - [`Avalanching`]: declares a wrapped hash as well mixed
//!
//! None of the first three claim to avalanche, so filters run their output
//! through [`mix64`](super::mix64).
//!
//! # Examples
//!
//! ```
//! use blockbloom::hash::{Avalanching, BloomHash, FnHash, Fnv1a};
//!
//! let fnv = Fnv1a::new();
//! assert_eq!(fnv.hash_one("key"), Fnv1a::new().hash_one("key"));
//!
//! let custom = Avalanching::new(FnHash::new(|s: &str| s.len() as u64));
//! assert!(<Avalanching<FnHash<fn(&str) -> u64>> as BloomHash<str>>::IS_AVALANCHING);
//! assert_eq!(custom.hash_one("four"), 4);
//! ```

#![allow(clippy::module_name_repetitions)]

use super::BloomHash;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// FNV-1a streaming state.
///
/// Stable across runs and Rust versions for a given byte stream, unlike
/// `std`'s `DefaultHasher`.
#[derive(Debug, Clone)]
pub struct FnvState {
    state: u64,
}

impl FnvState {
    /// State at the FNV offset basis.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Default for FnvState {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvState {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Seedable FNV-1a over the element's [`Hash`] stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fnv1a {
    seed: u64,
}

impl Fnv1a {
    /// FNV-1a with seed `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// FNV-1a with the seed mixed in ahead of the element bytes.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl<T: Hash + ?Sized> BloomHash<T> for Fnv1a {
    #[inline]
    fn hash_one(&self, item: &T) -> u64 {
        let mut state = FnvState::new();
        state.write_u64(self.seed);
        item.hash(&mut state);
        state.finish()
    }
}

/// Adapts a [`BuildHasher`] into a [`BloomHash`].
///
/// With a randomly keyed builder such as `RandomState`, positions differ from
/// process to process; do not persist such filters.
///
/// ```
/// use blockbloom::hash::{BloomHash, StdBuildHash};
/// use std::collections::hash_map::RandomState;
///
/// let hasher = StdBuildHash::new(RandomState::new());
/// assert_eq!(hasher.hash_one(&7u8), hasher.hash_one(&7u8));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StdBuildHash<S> {
    build: S,
}

impl<S: BuildHasher> StdBuildHash<S> {
    /// Wrap a `BuildHasher`.
    #[must_use]
    pub const fn new(build: S) -> Self {
        Self { build }
    }

    /// The wrapped builder.
    #[must_use]
    pub const fn build_hasher_ref(&self) -> &S {
        &self.build
    }
}

impl<T: Hash + ?Sized, S: BuildHasher> BloomHash<T> for StdBuildHash<S> {
    #[inline]
    fn hash_one(&self, item: &T) -> u64 {
        let mut state = self.build.build_hasher();
        item.hash(&mut state);
        state.finish()
    }
}

/// A closure used as a hash function.
#[derive(Clone, Copy, Default)]
pub struct FnHash<F> {
    f: F,
}

impl<F> FnHash<F> {
    /// Wrap `f`.
    #[must_use]
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnHash<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHash").finish_non_exhaustive()
    }
}

impl<T: ?Sized, F: Fn(&T) -> u64> BloomHash<T> for FnHash<F> {
    #[inline]
    fn hash_one(&self, item: &T) -> u64 {
        (self.f)(item)
    }
}

/// Marks the wrapped hash as avalanching, so its output is used unmixed.
///
/// Only wrap hashes whose output bits are all well mixed; a weak hash marked
/// avalanching raises the false-positive rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Avalanching<H> {
    inner: H,
}

impl<H> Avalanching<H> {
    /// Wrap `inner`.
    #[must_use]
    pub const fn new(inner: H) -> Self {
        Self { inner }
    }

    /// Unwrap.
    #[must_use]
    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<T: ?Sized, H: BloomHash<T>> BloomHash<T> for Avalanching<H> {
    const IS_AVALANCHING: bool = true;

    #[inline]
    fn hash_one(&self, item: &T) -> u64 {
        self.inner.hash_one(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::RandomState;

    #[test]
    fn test_fnv_known_vector() {
        // FNV-1a 64 of "a" is 0xaf63dc4c8601ec8c
        let mut state = FnvState::new();
        state.write(b"a");
        assert_eq!(state.finish(), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_fnv_seeds_differ() {
        let a = Fnv1a::with_seed(1).hash_one("x");
        let b = Fnv1a::with_seed(2).hash_one("x");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fnv_not_avalanching() {
        assert!(!<Fnv1a as BloomHash<str>>::IS_AVALANCHING);
    }

    #[test]
    fn test_std_build_hash_consistent() {
        let hasher = StdBuildHash::new(RandomState::new());
        assert_eq!(hasher.hash_one("same"), hasher.hash_one("same"));
        assert!(!<StdBuildHash<RandomState> as BloomHash<str>>::IS_AVALANCHING);
    }

    #[test]
    fn test_fn_hash_calls_closure() {
        let hasher = FnHash::new(|v: &[u8]| v.len() as u64 * 3);
        assert_eq!(hasher.hash_one(&[1u8, 2, 3][..]), 9);
    }

    #[test]
    fn test_avalanching_wrapper() {
        let hasher = Avalanching::new(Fnv1a::new());
        assert!(<Avalanching<Fnv1a> as BloomHash<u64>>::IS_AVALANCHING);
        assert_eq!(hasher.hash_one(&5u64), Fnv1a::new().hash_one(&5u64));
        assert_eq!(hasher.into_inner(), Fnv1a::new());
    }
}
