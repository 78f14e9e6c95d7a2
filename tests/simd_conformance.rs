//! The SIMD subfilters must set exactly the bits their scalar counterparts
//! set, whatever the lane count, stride and host CPU.

use blockbloom::subfilter::simd::avx2_enabled;
use blockbloom::subfilter::{FastMultiblock32, FastMultiblock64, Multiblock};
use blockbloom::Filter;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CAPACITY: usize = 64 * 1024;

fn corpus(seed: u64, count: usize) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen()).collect()
}

macro_rules! conformance {
    ($name:ident, $k:literal, $fast:ty, $scalar:ty, $stride:literal) => {
        #[test]
        fn $name() {
            let inserted = corpus(0x5eed ^ $k, 4_000);
            let probes = corpus(0xbeef ^ $k, 4_000);

            let mut fast = Filter::<u64, $k, $fast, $stride>::with_capacity(CAPACITY).unwrap();
            let mut scalar = Filter::<u64, $k, $scalar, $stride>::with_capacity(CAPACITY).unwrap();
            assert_eq!(fast.capacity(), scalar.capacity());

            fast.extend(&inserted);
            scalar.extend(&inserted);
            assert_eq!(fast.as_bytes(), scalar.as_bytes(), "bit patterns diverge");

            for key in inserted.iter().chain(&probes) {
                assert_eq!(fast.may_contain(key), scalar.may_contain(key), "answers diverge for {key}");
            }

            // Loading scalar bits into the fast filter keeps the answers
            let mut loaded = Filter::<u64, $k, $fast, $stride>::with_capacity(CAPACITY).unwrap();
            loaded.load_bytes(&scalar.to_bytes()).unwrap();
            assert!(inserted.iter().all(|key| loaded.may_contain(key)));
        }
    };
}

conformance!(fast32_k1_8_lanes, 1, FastMultiblock32<8>, Multiblock<u32, 8>, 0);
conformance!(fast32_k2_8_lanes_overlap, 2, FastMultiblock32<8>, Multiblock<u32, 8>, 4);
conformance!(fast32_k1_3_lanes, 1, FastMultiblock32<3>, Multiblock<u32, 3>, 0);
conformance!(fast32_k1_11_lanes, 1, FastMultiblock32<11>, Multiblock<u32, 11>, 1);
conformance!(fast32_k3_16_lanes, 3, FastMultiblock32<16>, Multiblock<u32, 16>, 0);
conformance!(fast64_k1_8_lanes, 1, FastMultiblock64<8>, Multiblock<u64, 8>, 0);
conformance!(fast64_k2_4_lanes_overlap, 2, FastMultiblock64<4>, Multiblock<u64, 4>, 8);
conformance!(fast64_k1_5_lanes, 1, FastMultiblock64<5>, Multiblock<u64, 5>, 0);
conformance!(fast64_k2_9_lanes, 2, FastMultiblock64<9>, Multiblock<u64, 9>, 3);
conformance!(fast64_k1_1_lane, 1, FastMultiblock64<1>, Multiblock<u64, 1>, 0);

#[test]
fn fpr_model_matches_scalar() {
    let m = 1 << 20;
    for n in [1_000, 50_000, 200_000] {
        assert_eq!(
            Filter::<u64, 1, FastMultiblock32<8>>::fpr_for(n, m),
            Filter::<u64, 1, Multiblock<u32, 8>>::fpr_for(n, m)
        );
        assert_eq!(
            Filter::<u64, 2, FastMultiblock64<4>, 8>::fpr_for(n, m),
            Filter::<u64, 2, Multiblock<u64, 4>, 8>::fpr_for(n, m)
        );
    }
}

#[test]
fn backend_selection_is_stable() {
    assert_eq!(avx2_enabled(), avx2_enabled());
}
