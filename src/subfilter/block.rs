use super::{lane_mask, LaneWord, Subfilter};
use crate::core::{BitArray, ByteAllocator};
use std::marker::PhantomData;

/// All `K'` bits inside a single word of type `W`.
///
/// One memory access per region, at the price of the highest false-positive
/// rate for a given bit budget: bits of different elements crowd into the same
/// small word.
///
/// `Block<u8, 1>` is the classic Bloom filter (one bit per hash position).
///
/// # Examples
///
/// ```
/// use blockbloom::core::BitArray;
/// use blockbloom::subfilter::{Block, Subfilter};
///
/// let mut bits = BitArray::new(64).unwrap();
/// Block::<u64, 4>::mark(&mut bits, 0, 0x1234_5678);
/// assert!(Block::<u64, 4>::check(&bits, 0, 0x1234_5678));
/// assert!(bits.count_ones() <= 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Block<W, const K: usize> {
    _word: PhantomData<W>,
}

impl<W: LaneWord, const K: usize> Block<W, K> {
    const NONZERO: () = assert!(K > 0, "Block needs at least one bit per region");

    #[inline(always)]
    fn mask(hash: u64) -> W {
        let () = Self::NONZERO;
        let mut mask = W::ZERO;
        for lane in 0..K {
            mask = mask | lane_mask::<W>(hash, lane);
        }
        mask
    }
}

impl<W: LaneWord, const K: usize> Subfilter for Block<W, K> {
    const REGION_BYTES: usize = W::BYTES;
    const BITS_PER_REGION: usize = K;
    const NAME: &'static str = "Block";

    #[inline]
    fn mark<A: ByteAllocator>(bits: &mut BitArray<A>, offset: usize, hash: u64) {
        bits.set_bits::<W>(offset, Self::mask(hash));
    }

    #[inline]
    fn check<A: ByteAllocator>(bits: &BitArray<A>, offset: usize, hash: u64) -> bool {
        bits.test_bits::<W>(offset, Self::mask(hash))
    }

    /// Lanes of one element can collide inside the word, so a query tests
    /// `D <= K'` distinct bits. The result averages the probability that `D`
    /// given bits are all covered by `K' i` uniform draws over the window.
    fn region_fpr(i: f64, width_bits: f64) -> f64 {
        let draws = K as f64 * i;
        let (distinct, max_distinct) = distinct_lanes(K, W::BITS as usize);

        let mut fpr = 0.0;
        for (d, &p) in distinct.iter().enumerate().take(max_distinct + 1) {
            if p > 0.0 {
                fpr += p * all_covered(d, draws, width_bits);
            }
        }
        fpr.clamp(0.0, 1.0)
    }
}

/// Distribution of the number of distinct bits among `lanes` uniform picks
/// from a `word_bits`-bit word. Entry `d` is `P(D = d)`.
fn distinct_lanes(lanes: usize, word_bits: usize) -> ([f64; 65], usize) {
    let max_distinct = lanes.min(word_bits);
    let bits = word_bits as f64;

    let mut dist = [0.0f64; 65];
    dist[0] = 1.0;
    for drawn in 0..lanes {
        for d in (0..=drawn.min(max_distinct)).rev() {
            let p = dist[d];
            if p == 0.0 {
                continue;
            }
            dist[d] = p * d as f64 / bits;
            if d < max_distinct {
                dist[d + 1] += p * (bits - d as f64) / bits;
            }
        }
    }
    (dist, max_distinct)
}

/// Probability that `draws` uniform picks over `width_bits` bits hit every
/// one of `d` given bits (inclusion-exclusion).
fn all_covered(d: usize, draws: f64, width_bits: f64) -> f64 {
    let mut sum = 0.0;
    let mut binom = 1.0;
    for j in 0..=d {
        let term = binom * (1.0 - j as f64 / width_bits).max(0.0).powf(draws);
        sum += if j % 2 == 0 { term } else { -term };
        binom = binom * (d - j) as f64 / (j + 1) as f64;
    }
    sum.max(0.0)
}
