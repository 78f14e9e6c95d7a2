//! Subfilter strategies: how bits are set and tested inside one region.
//!
//! A filter addresses `K` regions per element. Inside each region a
//! [`Subfilter`] sets (or tests) `K'` bits derived from the region's sub-hash.
//! Strategies are zero-sized marker types dispatched statically, so the
//! bit-twiddling is inlined into `insert` / `may_contain`.
//!
//! # Strategies
//!
//! | Strategy                    | Region          | Memory words touched | FPR     |
//! |-----------------------------|-----------------|----------------------|---------|
//! | [`Block<W, K'>`]            | one `W`         | 1                    | worst   |
//! | [`Multiblock<W, K'>`]       | `K'` × `W`      | up to `K'`           | better  |
//! | [`FastMultiblock32<K'>`]    | `K'` × `u32`    | up to `K'` (AVX2)    | = Multiblock<u32> |
//! | [`FastMultiblock64<K'>`]    | `K'` × `u64`    | up to `K'` (AVX2)    | = Multiblock<u64> |
//!
//! # Lane Hashing
//!
//! Bit `j` of a region (its *lane*) is chosen from the region hash by a salted
//! multiply:
//!
//! ```text
//! key_g   = group_key(hash, j / 8)           one key per group of 8 lanes
//! u32:    bit = ((key_g as u32) × SALT32[j % 8]) >> 27
//! others: bit = (key_g × SALT64[j % 8]) >> (64 - log2(W::BITS))
//! ```
//!
//! The top bits of an odd-multiplier product are well distributed, and the
//! same arithmetic maps one-to-one onto AVX2 lanes (`vpmulld` + `vpsrld` +
//! `vpsllvd`), which is what keeps the vectorized strategies bit-identical to
//! the scalar ones.

#![allow(clippy::cast_possible_truncation)]

mod block;
mod multiblock;
pub mod simd;

pub use crate::core::bitarray::Word;
pub use block::Block;
pub use multiblock::Multiblock;
pub use simd::{FastMultiblock32, FastMultiblock64};

use crate::core::{BitArray, ByteAllocator};
use crate::hash::mix64;
use crate::util::bitops::log2_exact;

/// Lanes sharing one group key.
pub const LANE_GROUP: usize = 8;

/// Multipliers for 32-bit lanes (the Parquet split-block Bloom filter salts).
pub const SALT32: [u32; LANE_GROUP] = [
    0x47b6_137b,
    0x4497_4d91,
    0x8824_ad5b,
    0xa2b7_289d,
    0x7054_95c7,
    0x2df1_424b,
    0x9efc_4947,
    0x5c6b_fb31,
];

/// Odd multipliers for 8-, 16- and 64-bit lanes.
pub const SALT64: [u64; LANE_GROUP] = [
    0x9e37_79b9_7f4a_7c15,
    0xbf58_476d_1ce4_e5b9,
    0x94d0_49bb_1331_11eb,
    0x2545_f491_4f6c_dd1d,
    0xd6e8_feb8_6659_fd93,
    0xff51_afd7_ed55_8ccd,
    0xc4ce_b9fe_1a85_ec53,
    0x87c3_7b91_1142_53d5,
];

/// Key for lanes `8g .. 8g + 8` of a region.
///
/// Group 0 uses the region hash unchanged; later groups (only reached when
/// `K' > 8`) remix it so their lanes are independent of the first eight.
#[inline(always)]
#[must_use]
pub const fn group_key(hash: u64, group: usize) -> u64 {
    if group == 0 {
        hash
    } else {
        mix64(hash ^ (group as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
    }
}

/// A [`Word`] that can derive a one-bit lane mask from a key.
pub trait LaneWord: Word {
    /// Mask with the single bit lane `lane % 8` of `key` selects.
    fn salted_bit(key: u64, lane: usize) -> Self;
}

impl LaneWord for u32 {
    #[inline(always)]
    fn salted_bit(key: u64, lane: usize) -> Self {
        let h = (key as u32).wrapping_mul(SALT32[lane % LANE_GROUP]);
        1u32 << (h >> 27)
    }
}

macro_rules! impl_lane_word_64 {
    ($($ty:ty),*) => {
        $(
            impl LaneWord for $ty {
                #[inline(always)]
                fn salted_bit(key: u64, lane: usize) -> Self {
                    const SHIFT: u32 = 64 - log2_exact(<$ty>::BITS);
                    let h = key.wrapping_mul(SALT64[lane % LANE_GROUP]);
                    1 << (h >> SHIFT) as u32
                }
            }
        )*
    };
}

impl_lane_word_64!(u8, u16, u64);

/// One-bit mask for lane `lane` of a region with hash `hash`.
#[inline(always)]
#[must_use]
pub fn lane_mask<W: LaneWord>(hash: u64, lane: usize) -> W {
    W::salted_bit(group_key(hash, lane / LANE_GROUP), lane)
}

/// Policy for setting and testing `K'` bits in one region of a [`BitArray`].
///
/// Implementors are stateless. For every `offset` with
/// `offset + REGION_BYTES <= bits.len_bytes()` and every `hash`:
///
/// - `mark` is idempotent
/// - after `mark(bits, offset, hash)`, `check(bits, offset, hash)` is `true`
///   until the array is cleared
pub trait Subfilter {
    /// Bytes covered by one region.
    const REGION_BYTES: usize;

    /// Bits set per region (`K'`).
    const BITS_PER_REGION: usize;

    /// Short human-readable name.
    const NAME: &'static str;

    /// Set this region's bits for `hash`.
    fn mark<A: ByteAllocator>(bits: &mut BitArray<A>, offset: usize, hash: u64);

    /// Whether all of this region's bits for `hash` are set.
    fn check<A: ByteAllocator>(bits: &BitArray<A>, offset: usize, hash: u64) -> bool;

    /// False-positive probability of one region that `i` elements have been
    /// marked into, when regions are effectively `width_bits` bits wide.
    fn region_fpr(i: f64, width_bits: f64) -> f64;
}
