//! Sizing math: monotonicity, achievability, and agreement with measured
//! false-positive rates.

use blockbloom::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

const TOLERANCE: f64 = 1e-12;

type Classic = Filter<u64, 7>;
type Blocked = Filter<u64, 1, Block<u64, 8>>;
type Split = Filter<u64, 1, FastMultiblock32<8>>;
type Overlapping = Filter<u64, 2, Multiblock<u64, 4>, 8>;

macro_rules! for_each_config {
    ($f:ident) => {
        $f::<Classic>(stringify!(Classic));
        $f::<Blocked>(stringify!(Blocked));
        $f::<Split>(stringify!(Split));
        $f::<Overlapping>(stringify!(Overlapping));
    };
}

trait Sizing {
    fn fpr_for(n: usize, m: usize) -> f64;
    fn capacity_for(n: usize, fpr: f64) -> blockbloom::Result<usize>;
}

macro_rules! impl_sizing {
    ($($t:ty),*) => {$(
        impl Sizing for $t {
            fn fpr_for(n: usize, m: usize) -> f64 {
                <$t>::fpr_for(n, m)
            }
            fn capacity_for(n: usize, fpr: f64) -> blockbloom::Result<usize> {
                <$t>::capacity_for(n, fpr)
            }
        }
    )*};
}

impl_sizing!(Classic, Blocked, Split, Overlapping);

fn non_decreasing_in_n<F: Sizing>(name: &str) {
    let m = 1 << 16;
    let mut prev = F::fpr_for(0, m);
    for n in (1..20_000).step_by(97) {
        let p = F::fpr_for(n, m);
        assert!(p + TOLERANCE >= prev, "{name}: fpr_for({n}, {m}) = {p} < {prev}");
        assert!((0.0..=1.0).contains(&p), "{name}: {p} out of range");
        prev = p;
    }
}

fn non_increasing_in_m<F: Sizing>(name: &str) {
    let n = 5_000;
    let mut prev = F::fpr_for(n, 0);
    assert_eq!(prev, 1.0);
    for m in (512..400_000).step_by(1_531) {
        let p = F::fpr_for(n, m);
        assert!(p <= prev + TOLERANCE, "{name}: fpr_for({n}, {m}) = {p} > {prev}");
        prev = p;
    }
}

fn capacity_meets_target<F: Sizing>(name: &str) {
    for &n in &[1, 10, 1_000, 100_000] {
        for &fpr in &[0.5, 0.1, 0.01, 1e-4, 1e-6] {
            let m = F::capacity_for(n, fpr).unwrap();
            assert!(m > 0, "{name}: zero capacity for n={n}");
            let achieved = F::fpr_for(n, m);
            assert!(achieved <= fpr * (1.0 + 1e-9), "{name}: n={n} target {fpr} got {achieved}");
        }
    }
}

fn capacity_monotone_in_fpr<F: Sizing>(name: &str) {
    let n = 10_000;
    let mut prev = 0;
    for &fpr in &[0.5, 0.2, 0.05, 0.01, 1e-3, 1e-4, 1e-5] {
        let m = F::capacity_for(n, fpr).unwrap();
        assert!(m >= prev, "{name}: tighter fpr {fpr} gave smaller capacity");
        prev = m;
    }
}

#[test]
fn fpr_non_decreasing_in_elements() {
    for_each_config!(non_decreasing_in_n);
}

#[test]
fn fpr_non_increasing_in_capacity() {
    for_each_config!(non_increasing_in_m);
}

#[test]
fn capacity_for_meets_target() {
    for_each_config!(capacity_meets_target);
}

#[test]
fn capacity_for_monotone() {
    for_each_config!(capacity_monotone_in_fpr);
}

#[test]
fn capacity_for_edges() {
    assert_eq!(Classic::capacity_for(0, 0.01).unwrap(), 0);
    assert_eq!(Classic::capacity_for(100, 1.0).unwrap(), 8);
    assert_eq!(Split::capacity_for(100, 1.0).unwrap(), 256);
    assert!(Classic::capacity_for(100, 0.0).is_err());
    assert!(Classic::capacity_for(100, -0.5).is_err());
    assert!(Classic::capacity_for(100, 1.5).is_err());
    assert!(Classic::capacity_for(100, f64::NAN).is_err());
    assert!(Classic::capacity_for(usize::MAX, 1e-300).unwrap_err().is_allocation_error());
}

#[test]
fn blocking_costs_accuracy() {
    // At equal memory, fewer cache lines touched means a higher FPR
    let (n, m) = (10_000, 100_000);
    let classic = Classic::fpr_for(n, m);
    let split = Split::fpr_for(n, m);
    let blocked = Blocked::fpr_for(n, m);
    assert!(classic < split, "{classic} vs {split}");
    assert!(split < blocked, "{split} vs {blocked}");
}

#[test]
fn overlap_improves_accuracy() {
    let (n, m) = (10_000, 100_000);
    let disjoint = Filter::<u64, 1, Multiblock<u64, 8>>::fpr_for(n, m);
    let overlapping = Filter::<u64, 1, Multiblock<u64, 8>, 8>::fpr_for(n, m);
    assert!(overlapping < disjoint, "{overlapping} vs {disjoint}");
}

fn measured_fpr<F: BloomFilter<u64>>(filter: &mut F, n: usize, seed: u64) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let inserted: HashSet<u64> = (0..n).map(|_| rng.gen()).collect();
    for key in &inserted {
        filter.insert(key);
    }

    let mut probes = 0usize;
    let mut hits = 0usize;
    while probes < 200_000 {
        let key: u64 = rng.gen();
        if inserted.contains(&key) {
            continue;
        }
        probes += 1;
        if filter.may_contain(&key) {
            hits += 1;
        }
    }
    hits as f64 / probes as f64
}

#[test]
fn model_tracks_measurement() {
    let n = 20_000;

    let mut classic = Classic::with_capacity(200_000).unwrap();
    let observed = measured_fpr(&mut classic, n, 21);
    let modelled = classic.estimated_fpr(n);
    assert!((observed - modelled).abs() < modelled * 0.3 + 0.001, "classic: {observed} vs {modelled}");

    let mut split = Split::with_capacity(200_000).unwrap();
    let observed = measured_fpr(&mut split, n, 22);
    let modelled = split.estimated_fpr(n);
    assert!((observed - modelled).abs() < modelled * 0.3 + 0.001, "split: {observed} vs {modelled}");

    let mut blocked = Blocked::with_capacity(200_000).unwrap();
    let observed = measured_fpr(&mut blocked, n, 24);
    let modelled = blocked.estimated_fpr(n);
    assert!((observed - modelled).abs() < modelled * 0.3 + 0.001, "blocked: {observed} vs {modelled}");

    let mut overlapping_block = Filter::<u64, 1, Block<u64, 8>, 1>::with_capacity(200_000).unwrap();
    let observed = measured_fpr(&mut overlapping_block, n, 25);
    let modelled = overlapping_block.estimated_fpr(n);
    assert!(observed < modelled * 1.1, "overlapping block: {observed} vs {modelled}");
    assert!(observed > modelled * 0.6, "overlapping block: {observed} vs {modelled}");

    let mut overlapping = Overlapping::with_capacity(200_000).unwrap();
    let observed = measured_fpr(&mut overlapping, n, 23);
    let modelled = overlapping.estimated_fpr(n);
    assert!(observed < modelled * 1.5 + 0.001, "overlapping: {observed} vs {modelled}");
}

#[test]
fn optimal_regions_guides_configuration() {
    use blockbloom::core::optimal_regions;

    let k = optimal_regions(10.0, 1);
    assert_eq!(k, 7);
    // The suggested K beats its neighbours for the classic filter
    let at = |k: usize| match k {
        6 => Filter::<u64, 6>::fpr_for(1_000, 10_000),
        7 => Filter::<u64, 7>::fpr_for(1_000, 10_000),
        8 => Filter::<u64, 8>::fpr_for(1_000, 10_000),
        _ => unreachable!(),
    };
    assert!(at(7) <= at(6) && at(7) <= at(8));
}

fn sized_filter_meets_target<F: BloomFilter<u64>>(mut filter: F, name: &str, n: usize, fpr: f64, seed: u64) {
    let observed = measured_fpr(&mut filter, n, seed);
    assert!(observed <= fpr * 1.15, "{name}: sized for {fpr}, measured {observed}");
}

#[test]
fn sized_block_filters_meet_target() {
    let (n, fpr) = (20_000, 0.01);
    sized_filter_meets_target(Blocked::with_fpr(n, fpr).unwrap(), "block_u64x8", n, fpr, 31);
    sized_filter_meets_target(
        Filter::<u64, 1, Block<u64, 8>, 1>::with_fpr(n, fpr).unwrap(),
        "block_u64x8_stride1",
        n,
        fpr,
        32,
    );
    sized_filter_meets_target(Filter::<u64, 1, Block<u32, 6>>::with_fpr(n, fpr).unwrap(), "block_u32x6", n, fpr, 33);
    sized_filter_meets_target(Overlapping::with_fpr(n, fpr).unwrap(), "multiblock_overlap", n, fpr, 34);
}
