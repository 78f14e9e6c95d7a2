//! Vectorized `Multiblock` strategies.
//!
//! [`FastMultiblock32<K'>`] and [`FastMultiblock64<K'>`] set and test exactly
//! the same bits as [`Multiblock<u32, K'>`](super::Multiblock) and
//! [`Multiblock<u64, K'>`](super::Multiblock), but compute eight (resp. four)
//! lane masks at once with AVX2:
//!
//! ```text
//! key  ──broadcast──► [k k k k k k k k]
//!                      × [s0 s1 s2 s3 s4 s5 s6 s7]      (vpmulld)
//!                      >> 27                             (vpsrld)
//!                      1 << shifts                       (vpsllvd)
//! region words ─────► OR / TESTC against the mask vector
//! ```
//!
//! Lanes left over after the last full vector use the scalar lane hash.
//!
//! # Backend Selection
//!
//! | Build                                 | Path                         |
//! |---------------------------------------|------------------------------|
//! | `simd` feature, x86-64, `+avx2`       | AVX2, no runtime check       |
//! | `simd` feature, x86-64                | AVX2 if detected at runtime  |
//! | `simd` feature, AArch64               | scalar (no NEON variable shifts worth it) |
//! | no `simd` feature / other targets     | scalar                       |
//!
//! Whatever the path, the bit-level result is identical, so filters built on
//! one machine can be loaded and queried on another of the same endianness.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use super::{Multiblock, Subfilter};
use crate::core::{BitArray, ByteAllocator};
use std::marker::PhantomData;

/// Whether `FastMultiblock*` run their AVX2 path in this process.
#[inline]
#[must_use]
pub fn avx2_enabled() -> bool {
    #[cfg(all(feature = "simd", target_arch = "x86_64", target_feature = "avx2"))]
    {
        true
    }

    #[cfg(all(feature = "simd", target_arch = "x86_64", not(target_feature = "avx2")))]
    {
        // std caches the CPUID result after the first call
        is_x86_feature_detected!("avx2")
    }

    #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
    {
        false
    }
}

/// [`Multiblock<u32, K'>`](super::Multiblock), eight lanes per AVX2 operation.
///
/// # Examples
///
/// ```
/// use blockbloom::core::BitArray;
/// use blockbloom::subfilter::{FastMultiblock32, Multiblock, Subfilter};
///
/// let mut fast = BitArray::new(512).unwrap();
/// let mut scalar = BitArray::new(512).unwrap();
/// FastMultiblock32::<8>::mark(&mut fast, 4, 0xabcdef);
/// Multiblock::<u32, 8>::mark(&mut scalar, 4, 0xabcdef);
/// assert_eq!(fast, scalar);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FastMultiblock32<const K: usize> {
    _marker: PhantomData<()>,
}

/// [`Multiblock<u64, K'>`](super::Multiblock), four lanes per AVX2 operation.
#[derive(Debug, Clone, Copy)]
pub struct FastMultiblock64<const K: usize> {
    _marker: PhantomData<()>,
}

impl<const K: usize> Subfilter for FastMultiblock32<K> {
    const REGION_BYTES: usize = K * 4;
    const BITS_PER_REGION: usize = K;
    const NAME: &'static str = "FastMultiblock32";

    #[inline]
    fn mark<A: ByteAllocator>(bits: &mut BitArray<A>, offset: usize, hash: u64) {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if avx2_enabled() {
                let region = &mut bits.as_bytes_mut()[offset..offset + Self::REGION_BYTES];
                // SAFETY: AVX2 availability checked above; region spans K u32 words
                unsafe { avx2::mark32(region, hash, K) };
                return;
            }
        }
        Multiblock::<u32, K>::mark(bits, offset, hash);
    }

    #[inline]
    fn check<A: ByteAllocator>(bits: &BitArray<A>, offset: usize, hash: u64) -> bool {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if avx2_enabled() {
                let region = &bits.as_bytes()[offset..offset + Self::REGION_BYTES];
                // SAFETY: AVX2 availability checked above; region spans K u32 words
                return unsafe { avx2::check32(region, hash, K) };
            }
        }
        Multiblock::<u32, K>::check(bits, offset, hash)
    }

    fn region_fpr(i: f64, width_bits: f64) -> f64 {
        Multiblock::<u32, K>::region_fpr(i, width_bits)
    }
}

impl<const K: usize> Subfilter for FastMultiblock64<K> {
    const REGION_BYTES: usize = K * 8;
    const BITS_PER_REGION: usize = K;
    const NAME: &'static str = "FastMultiblock64";

    #[inline]
    fn mark<A: ByteAllocator>(bits: &mut BitArray<A>, offset: usize, hash: u64) {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if avx2_enabled() {
                let region = &mut bits.as_bytes_mut()[offset..offset + Self::REGION_BYTES];
                // SAFETY: AVX2 availability checked above; region spans K u64 words
                unsafe { avx2::mark64(region, hash, K) };
                return;
            }
        }
        Multiblock::<u64, K>::mark(bits, offset, hash);
    }

    #[inline]
    fn check<A: ByteAllocator>(bits: &BitArray<A>, offset: usize, hash: u64) -> bool {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            if avx2_enabled() {
                let region = &bits.as_bytes()[offset..offset + Self::REGION_BYTES];
                // SAFETY: AVX2 availability checked above; region spans K u64 words
                return unsafe { avx2::check64(region, hash, K) };
            }
        }
        Multiblock::<u64, K>::check(bits, offset, hash)
    }

    fn region_fpr(i: f64, width_bits: f64) -> f64 {
        Multiblock::<u64, K>::region_fpr(i, width_bits)
    }
}

/// AVX2 kernels over a raw region slice.
///
/// Every function requires AVX2 and a `region` of at least `lanes` words.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub(crate) mod avx2 {
    use crate::subfilter::{group_key, lane_mask, LaneWord, LANE_GROUP, SALT32, SALT64};
    use std::arch::x86_64::*;
    use std::ops::Range;

    /// Eight 32-bit one-bit masks for `key`, lane `j` in 32-bit element `j`.
    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn masks32(key: u32) -> __m256i {
        // SAFETY: SALT32 is 8 × u32 = 32 bytes, unaligned load
        let salts = _mm256_loadu_si256(SALT32.as_ptr().cast::<__m256i>());
        let h = _mm256_mullo_epi32(_mm256_set1_epi32(key as i32), salts);
        let shifts = _mm256_srli_epi32(h, 27);
        _mm256_sllv_epi32(_mm256_set1_epi32(1), shifts)
    }

    /// Four 64-bit one-bit masks for `key` using `SALT64[half * 4 ..][..4]`.
    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn masks64(key: u64, half: usize) -> __m256i {
        // SAFETY: half is 0 or 1, so the 4 × u64 read stays inside SALT64
        let salts = _mm256_loadu_si256(SALT64.as_ptr().add(half * 4).cast::<__m256i>());
        let h = mul_u64x4(_mm256_set1_epi64x(key as i64), salts);
        let shifts = _mm256_srli_epi64(h, 58);
        _mm256_sllv_epi64(_mm256_set1_epi64x(1), shifts)
    }

    /// Low 64 bits of four 64×64 products.
    ///
    /// AVX2 has no 64-bit multiply; built from 32×32→64 partial products:
    /// `lo(a × b) = a_lo·b_lo + ((a_lo·b_hi + a_hi·b_lo) << 32)`.
    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn mul_u64x4(a: __m256i, b: __m256i) -> __m256i {
        let a_hi = _mm256_srli_epi64(a, 32);
        let b_hi = _mm256_srli_epi64(b, 32);

        let lo_lo = _mm256_mul_epu32(a, b);
        let lo_hi = _mm256_mul_epu32(a, b_hi);
        let hi_lo = _mm256_mul_epu32(a_hi, b);

        let cross = _mm256_slli_epi64(_mm256_add_epi64(lo_hi, hi_lo), 32);
        _mm256_add_epi64(lo_lo, cross)
    }

    #[inline]
    fn mark_scalar<W: LaneWord>(region: &mut [u8], hash: u64, lanes: Range<usize>) {
        for lane in lanes {
            let bytes = &mut region[lane * W::BYTES..];
            (W::read_ne(bytes) | lane_mask::<W>(hash, lane)).write_ne(bytes);
        }
    }

    #[inline]
    fn check_scalar<W: LaneWord>(region: &[u8], hash: u64, lanes: Range<usize>) -> bool {
        for lane in lanes {
            let mask = lane_mask::<W>(hash, lane);
            if W::read_ne(&region[lane * W::BYTES..]) & mask != mask {
                return false;
            }
        }
        true
    }

    /// # Safety
    ///
    /// AVX2 must be available and `region.len() >= lanes * 4`.
    #[target_feature(enable = "avx2")]
    pub(crate) unsafe fn mark32(region: &mut [u8], hash: u64, lanes: usize) {
        debug_assert!(region.len() >= lanes * 4);
        let groups = lanes / LANE_GROUP;
        for g in 0..groups {
            let masks = masks32(group_key(hash, g) as u32);
            // SAFETY: bytes g*32 .. g*32+32 lie within the first `lanes` words
            let p = region.as_mut_ptr().add(g * 32).cast::<__m256i>();
            _mm256_storeu_si256(p, _mm256_or_si256(_mm256_loadu_si256(p), masks));
        }
        mark_scalar::<u32>(region, hash, groups * LANE_GROUP..lanes);
    }

    /// # Safety
    ///
    /// AVX2 must be available and `region.len() >= lanes * 4`.
    #[target_feature(enable = "avx2")]
    pub(crate) unsafe fn check32(region: &[u8], hash: u64, lanes: usize) -> bool {
        debug_assert!(region.len() >= lanes * 4);
        let groups = lanes / LANE_GROUP;
        for g in 0..groups {
            let masks = masks32(group_key(hash, g) as u32);
            // SAFETY: bytes g*32 .. g*32+32 lie within the first `lanes` words
            let words = _mm256_loadu_si256(region.as_ptr().add(g * 32).cast::<__m256i>());
            // testc: (!words & masks) == 0
            if _mm256_testc_si256(words, masks) == 0 {
                return false;
            }
        }
        check_scalar::<u32>(region, hash, groups * LANE_GROUP..lanes)
    }

    /// # Safety
    ///
    /// AVX2 must be available and `region.len() >= lanes * 8`.
    #[target_feature(enable = "avx2")]
    pub(crate) unsafe fn mark64(region: &mut [u8], hash: u64, lanes: usize) {
        debug_assert!(region.len() >= lanes * 8);
        let quads = lanes / 4;
        for q in 0..quads {
            let masks = masks64(group_key(hash, q / 2), q % 2);
            // SAFETY: bytes q*32 .. q*32+32 lie within the first `lanes` words
            let p = region.as_mut_ptr().add(q * 32).cast::<__m256i>();
            _mm256_storeu_si256(p, _mm256_or_si256(_mm256_loadu_si256(p), masks));
        }
        mark_scalar::<u64>(region, hash, quads * 4..lanes);
    }

    /// # Safety
    ///
    /// AVX2 must be available and `region.len() >= lanes * 8`.
    #[target_feature(enable = "avx2")]
    pub(crate) unsafe fn check64(region: &[u8], hash: u64, lanes: usize) -> bool {
        debug_assert!(region.len() >= lanes * 8);
        let quads = lanes / 4;
        for q in 0..quads {
            let masks = masks64(group_key(hash, q / 2), q % 2);
            // SAFETY: bytes q*32 .. q*32+32 lie within the first `lanes` words
            let words = _mm256_loadu_si256(region.as_ptr().add(q * 32).cast::<__m256i>());
            if _mm256_testc_si256(words, masks) == 0 {
                return false;
            }
        }
        check_scalar::<u64>(region, hash, quads * 4..lanes)
    }
}
