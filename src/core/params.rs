//! Capacity and false-positive-rate calculations.
//!
//! Unlike the textbook formula `p = (1 - e^(-kn/m))^k`, these calculations
//! account for the subfilter strategy: elements do not scatter bits over the
//! whole array but concentrate `K'` bits into each of `K` regions.
//!
//! # Mathematical Background
//!
//! Given:
//! - `n`: number of inserted elements, `m`: capacity in bits, `c = m / n`
//! - `K`: regions per element, `K'`: bits per region
//! - `w = region_bytes × 8 + (region_bytes - stride) × 2`: effective width
//!   of a region. Overlapping neighbours (`stride < region_bytes`) widen it
//!   by a quarter of the overlap
//!
//! The number of elements that mark a given region is approximately
//! Poisson-distributed with mean `λ = w × K / c`. The probability that all
//! `K` regions of a fresh element test positive is
//!
//! ```text
//! FPR = ( Σ_i  Poisson(i; λ) × region_fpr(i, w) )^K
//! ```
//!
//! where `region_fpr` comes from the [`Subfilter`]:
//!
//! - `Block`:      `Σ_d P(D = d) × P(d given bits covered by K' i draws over w)`,
//!   where `D` counts the distinct bits among `K'` lanes of one word
//! - `Multiblock`: `(1 - (1 - K'/w)^i)^K'`
//!
//! The sum is taken over a window of ±12 standard deviations around `λ`,
//! which captures all of the probability mass an `f64` can represent.
//!
//! # Capacity Rounding
//!
//! Capacities are rounded up so that every slot the position generator can
//! address keeps its whole region inside the array:
//!
//! ```text
//! bytes    = max(ceil(m / 8), region_bytes)
//! slots    = ceil((bytes - region_bytes) / stride) + 1
//! capacity = ((slots - 1) × stride + region_bytes) × 8
//! ```
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Putze, Sanders & Singler (2007). "Cache-, Hash- and Space-Efficient Bloom Filters"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{BloomError, Result};
use crate::subfilter::Subfilter;
use crate::util::bitops::{bits_to_bytes, div_ceil};
use std::f64::consts::{LN_2, PI};

/// Largest capacity in bits whose byte buffer is a valid allocation size.
pub const MAX_CAPACITY_BITS: usize = (isize::MAX as usize / 8) * 8;

/// Width of the Poisson summation window in standard deviations.
const POISSON_SIGMAS: f64 = 12.0;

/// Above this mean the Poisson sum is replaced by its value at the mean.
///
/// Only reached for hopelessly overfilled filters, where every region is
/// saturated and the per-region FPR is flat.
const POISSON_DIRECT_LAMBDA: f64 = 1.0e6;

/// `ln(i!)` exactly below this, by Stirling's series above.
const EXACT_LOG_FACTORIAL: usize = 64;

/// Bisection steps on bits-per-element in [`capacity_for`].
const BISECTION_STEPS: usize = 64;

/// Stride in bytes, with `0` meaning "region size".
#[inline]
#[must_use]
pub const fn resolve_stride(region_bytes: usize, stride: usize) -> usize {
    if stride == 0 {
        region_bytes
    } else {
        stride
    }
}

/// Effective region width in bits for the FPR model.
#[inline]
#[must_use]
pub const fn effective_width_bits(region_bytes: usize, stride: usize) -> usize {
    region_bytes * 8 + (region_bytes - stride) * 2
}

/// Round a requested capacity up to the nearest usable one.
///
/// `0` stays `0`. The result is a fixed point: rounding a rounded capacity
/// returns it unchanged.
///
/// # Errors
///
/// [`BloomError::CapacityOverflow`] if the rounded capacity exceeds
/// [`MAX_CAPACITY_BITS`].
///
/// # Examples
///
/// ```
/// use blockbloom::core::params::round_capacity;
///
/// // 8-byte regions, no overlap: whole regions only
/// assert_eq!(round_capacity(0, 8, 8).unwrap(), 0);
/// assert_eq!(round_capacity(1, 8, 8).unwrap(), 64);
/// assert_eq!(round_capacity(65, 8, 8).unwrap(), 128);
///
/// // Overlapping by one byte: any byte count of at least a region
/// assert_eq!(round_capacity(100, 8, 1).unwrap(), 104);
/// ```
pub fn round_capacity(m: usize, region_bytes: usize, stride: usize) -> Result<usize> {
    debug_assert!(stride > 0 && stride <= region_bytes);
    if m == 0 {
        return Ok(0);
    }

    let bytes = bits_to_bytes(m).max(region_bytes);
    let slots = div_ceil(bytes - region_bytes, stride) + 1;

    (slots - 1)
        .checked_mul(stride)
        .and_then(|b| b.checked_add(region_bytes))
        .and_then(|b| b.checked_mul(8))
        .filter(|&bits| bits <= MAX_CAPACITY_BITS)
        .ok_or_else(|| BloomError::capacity_overflow(m))
}

/// `ln(i!)`.
fn log_factorial(i: usize) -> f64 {
    if i < EXACT_LOG_FACTORIAL {
        (2..=i).map(|j| (j as f64).ln()).sum()
    } else {
        let x = i as f64;
        x * x.ln() - x + 0.5 * (2.0 * PI * x).ln() + 1.0 / (12.0 * x) - 1.0 / (360.0 * x * x * x)
    }
}

/// `E[region_fpr(X, w)]` for `X ~ Poisson(λ)`.
fn expected_region_fpr<S: Subfilter>(lambda: f64, w: f64) -> f64 {
    if lambda > POISSON_DIRECT_LAMBDA {
        return S::region_fpr(lambda, w);
    }

    let spread = POISSON_SIGMAS * lambda.sqrt();
    let lo = (lambda - spread - 1.0).floor().max(0.0) as usize;
    let hi = (lambda + spread + POISSON_SIGMAS).ceil() as usize;
    let ln_lambda = lambda.ln();

    let mut sum = 0.0;
    for i in lo..=hi {
        let ln_p = i as f64 * ln_lambda - lambda - log_factorial(i);
        sum += ln_p.exp() * S::region_fpr(i as f64, w);
    }
    sum.min(1.0)
}

/// FPR at `c` bits per element.
fn fpr_for_bits_per_element<S: Subfilter>(k: usize, stride: usize, c: f64) -> f64 {
    let w = effective_width_bits(S::REGION_BYTES, stride) as f64;
    let lambda = w * k as f64 / c;
    expected_region_fpr::<S>(lambda, w).powf(k as f64)
}

/// Expected false-positive rate after inserting `n` elements into `m` bits.
///
/// `k` is the number of regions per element and `stride` the resolved stride
/// in bytes. `m == 0` gives `1.0`; `n == 0` gives `0.0`.
///
/// Non-decreasing in `n` and non-increasing in `m`.
///
/// # Examples
///
/// ```
/// use blockbloom::core::params::fpr_for;
/// use blockbloom::subfilter::Block;
///
/// // Classic Bloom filter: 10 bits/element, 7 hashes ≈ 0.82%
/// let p = fpr_for::<Block<u8, 1>>(7, 1, 1000, 10_000);
/// assert!(p > 0.007 && p < 0.0095, "{p}");
///
/// assert_eq!(fpr_for::<Block<u8, 1>>(7, 1, 1000, 0), 1.0);
/// assert_eq!(fpr_for::<Block<u8, 1>>(7, 1, 0, 10_000), 0.0);
/// ```
#[must_use]
pub fn fpr_for<S: Subfilter>(k: usize, stride: usize, n: usize, m: usize) -> f64 {
    if m == 0 {
        return 1.0;
    }
    if n == 0 {
        return 0.0;
    }
    fpr_for_bits_per_element::<S>(k, stride, m as f64 / n as f64)
}

/// Smallest usable capacity (in bits) keeping the FPR of `n` elements at or
/// below `fpr`.
///
/// `n == 0` gives `0`; `fpr == 1` gives one region. The result is already
/// rounded with [`round_capacity`].
///
/// # Errors
///
/// - [`BloomError::FalsePositiveRateOutOfBounds`] if `fpr` is not in `(0, 1]`
/// - [`BloomError::CapacityOverflow`] if the capacity is not representable
///
/// # Examples
///
/// ```
/// use blockbloom::core::params::{capacity_for, fpr_for};
/// use blockbloom::subfilter::Multiblock;
///
/// type S = Multiblock<u64, 8>;
/// let m = capacity_for::<S>(1, 64, 10_000, 0.001).unwrap();
/// assert!(fpr_for::<S>(1, 64, 10_000, m) <= 0.001);
/// assert_eq!(m % 512, 0);
///
/// assert!(capacity_for::<S>(1, 64, 10_000, 0.0).is_err());
/// assert!(capacity_for::<S>(1, 64, usize::MAX, 1e-300).is_err());
/// ```
pub fn capacity_for<S: Subfilter>(k: usize, stride: usize, n: usize, fpr: f64) -> Result<usize> {
    if !(fpr > 0.0 && fpr <= 1.0) {
        return Err(BloomError::fp_rate_out_of_bounds(fpr));
    }
    if n == 0 {
        return Ok(0);
    }
    if fpr >= 1.0 {
        return round_capacity(1, S::REGION_BYTES, stride);
    }

    let n_f = n as f64;
    let max_c = MAX_CAPACITY_BITS as f64 / n_f;
    let overflow = || {
        tracing::warn!(n, fpr, "requested false positive rate is not achievable");
        BloomError::capacity_overflow(usize::MAX)
    };

    // Exponential search for an upper bound on bits per element
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    while fpr_for_bits_per_element::<S>(k, stride, hi) > fpr {
        if hi > max_c {
            return Err(overflow());
        }
        lo = hi;
        hi *= 2.0;
    }

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if fpr_for_bits_per_element::<S>(k, stride, mid) <= fpr {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    let m = (hi * n_f).ceil();
    if m > MAX_CAPACITY_BITS as f64 {
        return Err(overflow());
    }
    round_capacity(m as usize, S::REGION_BYTES, stride)
}

/// Number of regions per element that minimizes the FPR at `bits_per_element`
/// bits per element, for subfilters setting `bits_per_region` bits each.
///
/// The total number of bits touched per element, `K × K'`, should be close to
/// `c × ln 2`. Always at least 1.
///
/// # Examples
///
/// ```
/// use blockbloom::core::params::optimal_regions;
///
/// assert_eq!(optimal_regions(10.0, 1), 7);
/// assert_eq!(optimal_regions(10.0, 7), 1);
/// assert_eq!(optimal_regions(0.5, 8), 1);
/// ```
#[must_use]
pub fn optimal_regions(bits_per_element: f64, bits_per_region: usize) -> usize {
    let total = bits_per_element * LN_2;
    ((total / bits_per_region.max(1) as f64).round() as usize).max(1)
}
