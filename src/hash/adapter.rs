//! Hash post-processing between the user's hash and position derivation.

use super::BloomHash;

/// 64-bit finalizer (MurmurHash3 `fmix64` constants).
///
/// A bijection on `u64`: distinct hashes stay distinct after mixing.
///
/// # Examples
///
/// ```
/// use blockbloom::hash::mix64;
///
/// assert_eq!(mix64(0), 0);
/// assert_ne!(mix64(1), mix64(2));
/// ```
#[inline]
#[must_use]
pub const fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}

/// Owns a filter's hash function and produces the mixed hash positions are
/// derived from.
///
/// If the hash does not declare itself avalanching, [`mix64`] is applied to
/// its output. The choice is made per hash type at compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashAdapter<H> {
    inner: H,
}

impl<H> HashAdapter<H> {
    /// Wrap `hasher`.
    #[must_use]
    pub const fn new(hasher: H) -> Self {
        Self { inner: hasher }
    }

    /// The wrapped hash function.
    #[must_use]
    pub const fn get_ref(&self) -> &H {
        &self.inner
    }

    /// Unwrap the hash function.
    #[must_use]
    pub fn into_inner(self) -> H {
        self.inner
    }

    /// Mixed hash of `item`.
    #[inline]
    pub fn hash<T: ?Sized>(&self, item: &T) -> u64
    where
        H: BloomHash<T>,
    {
        let h = self.inner.hash_one(item);
        if H::IS_AVALANCHING {
            h
        } else {
            mix64(h)
        }
    }
}
