//! Bit manipulation and integer arithmetic helpers.
//!
//! These are the small building blocks the position generator, the
//! subfilters and the capacity rounding share:
//!
//! - [`wymix`]: 64×64→128 multiply folded back to 64 bits
//! - [`fastrange`]: multiply-shift range reduction (no division)
//! - [`bits_to_bytes`] / [`div_ceil`]: checked rounding helpers
//!
//! # Performance Notes
//!
//! - `wymix` and `fastrange` compile to a single `MUL`/`MULX` plus an XOR
//! - Rounding helpers are only used on cold paths (construction, reset)

#![allow(clippy::cast_possible_truncation)]

/// Fold the 128-bit product of `a` and `b` into 64 bits.
///
/// ```text
/// wymix(a, b) = let r = a × b as u128
///               in (r >> 64) ⊕ (r & 0xFFFFFFFFFFFFFFFF)
/// ```
///
/// # Examples
///
/// ```
/// use blockbloom::util::bitops::wymix;
///
/// assert_eq!(wymix(0, 12345), 0);
/// assert_ne!(wymix(1, 0x9e37_79b9_7f4a_7c15), wymix(2, 0x9e37_79b9_7f4a_7c15));
/// ```
#[inline(always)]
#[must_use]
pub const fn wymix(a: u64, b: u64) -> u64 {
    let r = (a as u128).wrapping_mul(b as u128);
    ((r >> 64) as u64) ^ (r as u64)
}

/// Map a uniformly distributed `hash` onto `[0, n)` without division.
///
/// Uses the high half of `hash × n` (Lemire's multiply-shift reduction), so the
/// result depends mostly on the high bits of `hash`.
///
/// # Examples
///
/// ```
/// use blockbloom::util::bitops::fastrange;
///
/// assert_eq!(fastrange(0, 10), 0);
/// assert_eq!(fastrange(u64::MAX, 10), 9);
/// assert_eq!(fastrange(u64::MAX / 2, 10), 4);
/// ```
#[inline(always)]
#[must_use]
pub const fn fastrange(hash: u64, n: usize) -> usize {
    (((hash as u128) * (n as u128)) >> 64) as usize
}

/// `ceil(a / b)`, `b` must be non-zero.
///
/// # Examples
///
/// ```
/// use blockbloom::util::bitops::div_ceil;
///
/// assert_eq!(div_ceil(0, 8), 0);
/// assert_eq!(div_ceil(1, 8), 1);
/// assert_eq!(div_ceil(16, 8), 2);
/// assert_eq!(div_ceil(usize::MAX, 8), usize::MAX / 8 + 1);
/// ```
#[inline]
#[must_use]
pub const fn div_ceil(a: usize, b: usize) -> usize {
    a / b + (a % b != 0) as usize
}

/// Number of bytes needed to hold `n_bits` bits.
///
/// # Examples
///
/// ```
/// use blockbloom::util::bitops::bits_to_bytes;
///
/// assert_eq!(bits_to_bytes(0), 0);
/// assert_eq!(bits_to_bytes(1), 1);
/// assert_eq!(bits_to_bytes(64), 8);
/// assert_eq!(bits_to_bytes(65), 9);
/// ```
#[inline]
#[must_use]
pub const fn bits_to_bytes(n_bits: usize) -> usize {
    div_ceil(n_bits, 8)
}

/// Base-2 logarithm of a power of two.
///
/// Evaluated in const context by the subfilters to turn a word width into a
/// shift amount.
///
/// # Panics
///
/// Panics (at compile time when used in a const) if `n` is not a power of two.
#[inline]
#[must_use]
pub const fn log2_exact(n: u32) -> u32 {
    assert!(n.is_power_of_two(), "log2_exact: not a power of two");
    n.trailing_zeros()
}
