use super::{lane_mask, LaneWord, Subfilter};
use crate::core::{BitArray, ByteAllocator};
use std::marker::PhantomData;

/// One bit in each of `K'` consecutive words of type `W`.
///
/// Spreads each element over `K' × W::BITS` bits, which lowers the
/// false-positive rate compared with [`Block`](super::Block) at the cost of
/// touching more memory per region. `check` stops at the first word missing
/// its bit.
///
/// # Examples
///
/// ```
/// use blockbloom::core::BitArray;
/// use blockbloom::subfilter::{Multiblock, Subfilter};
///
/// let mut bits = BitArray::new(256).unwrap();
/// Multiblock::<u32, 8>::mark(&mut bits, 0, 7);
/// assert!(Multiblock::<u32, 8>::check(&bits, 0, 7));
/// assert_eq!(bits.count_ones(), 8); // one bit per word
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Multiblock<W, const K: usize> {
    _word: PhantomData<W>,
}

impl<W: LaneWord, const K: usize> Multiblock<W, K> {
    const NONZERO: () = assert!(K > 0, "Multiblock needs at least one word per region");
}

impl<W: LaneWord, const K: usize> Subfilter for Multiblock<W, K> {
    const REGION_BYTES: usize = K * W::BYTES;
    const BITS_PER_REGION: usize = K;
    const NAME: &'static str = "Multiblock";

    #[inline]
    fn mark<A: ByteAllocator>(bits: &mut BitArray<A>, offset: usize, hash: u64) {
        let () = Self::NONZERO;
        for lane in 0..K {
            bits.set_bits::<W>(offset + lane * W::BYTES, lane_mask::<W>(hash, lane));
        }
    }

    #[inline]
    fn check<A: ByteAllocator>(bits: &BitArray<A>, offset: usize, hash: u64) -> bool {
        let () = Self::NONZERO;
        (0..K).all(|lane| bits.test_bits::<W>(offset + lane * W::BYTES, lane_mask::<W>(hash, lane)))
    }

    fn region_fpr(i: f64, width_bits: f64) -> f64 {
        let k = K as f64;
        (1.0 - (1.0 - k / width_bits).powf(i)).powf(k)
    }
}
