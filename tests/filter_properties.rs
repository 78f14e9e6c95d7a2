//! Behavioural properties every filter configuration must satisfy.

use blockbloom::hash::Fnv1a;
use blockbloom::prelude::*;
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

fn random_strings(seed: u64, count: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(4..24);
            (&mut rng).sample_iter(&Alphanumeric).take(len).map(char::from).collect()
        })
        .collect()
}

fn random_keys(seed: u64, count: usize) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen()).collect()
}

fn assert_no_false_negatives<F: BloomFilter<u64>>(mut filter: F, keys: &[u64]) {
    filter.insert_all(keys);
    for key in keys {
        assert!(filter.may_contain(key), "false negative for {key}");
    }
}

#[test]
fn no_false_negatives_across_configurations() {
    let keys = random_keys(1, 20_000);

    assert_no_false_negatives(Filter::<u64, 1>::with_capacity(100_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 7>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 1, Block<u64, 8>>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 3, Block<u16, 2>, 1>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 1, Multiblock<u8, 12>>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 2, Multiblock<u64, 4>, 8>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 1, Multiblock<u32, 16>, 1>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 1, FastMultiblock32<8>>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 2, FastMultiblock32<11>, 4>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 1, FastMultiblock64<8>>::with_capacity(200_000).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 3, FastMultiblock64<3>, 2>::with_capacity(200_000).unwrap(), &keys);
}

#[test]
fn no_false_negatives_at_minimum_capacity() {
    // A single region: every element lands in the same place
    let keys = random_keys(2, 500);
    assert_no_false_negatives(Filter::<u64, 4, Multiblock<u64, 8>>::with_capacity(1).unwrap(), &keys);
    assert_no_false_negatives(Filter::<u64, 2, FastMultiblock32<8>, 1>::with_capacity(1).unwrap(), &keys);
}

#[test]
fn insertion_is_deterministic() {
    let words = random_strings(3, 2_000);

    let mut a = Filter::<str, 3, Block<u32, 4>, 2, Fnv1a>::with_capacity(50_000).unwrap();
    let mut b = Filter::<str, 3, Block<u32, 4>, 2, Fnv1a>::with_capacity(50_000).unwrap();
    for w in &words {
        a.insert(w);
    }
    for w in words.iter().rev() {
        b.insert(w);
    }

    // Order does not matter either
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn combine_or_equals_union() {
    let left = random_keys(4, 3_000);
    let right = random_keys(5, 3_000);

    let mut a = Filter::<u64, 2, Multiblock<u32, 8>>::with_capacity(100_000).unwrap();
    let mut b = Filter::<u64, 2, Multiblock<u32, 8>>::with_capacity(100_000).unwrap();
    let mut both = Filter::<u64, 2, Multiblock<u32, 8>>::with_capacity(100_000).unwrap();
    a.extend(&left);
    b.extend(&right);
    both.extend(left.iter().chain(&right));

    a.combine_or(&b);
    assert_eq!(a, both);
    for key in left.iter().chain(&right) {
        assert!(a.may_contain(key));
    }
}

#[test]
fn combine_and_keeps_common_elements() {
    let common = random_keys(6, 1_000);
    let only_a = random_keys(7, 1_000);
    let only_b = random_keys(8, 1_000);

    let mut a = Filter::<u64, 1, FastMultiblock64<8>>::with_capacity(100_000).unwrap();
    let mut b = Filter::<u64, 1, FastMultiblock64<8>>::with_capacity(100_000).unwrap();
    let mut exact = Filter::<u64, 1, FastMultiblock64<8>>::with_capacity(100_000).unwrap();
    a.extend(common.iter().chain(&only_a));
    b.extend(common.iter().chain(&only_b));
    exact.extend(&common);

    a.combine_and(&b);
    for key in &common {
        assert!(a.may_contain(key));
    }
    // Every bit of the exact filter survives the intersection
    for (x, e) in a.as_bytes().iter().zip(exact.as_bytes()) {
        assert_eq!(x & e, *e);
    }
}

#[test]
fn raw_roundtrip_preserves_answers() {
    let words = random_strings(9, 5_000);
    let probes = random_strings(10, 5_000);

    let mut filter = Filter::<str, 2, FastMultiblock32<8>, 4>::with_fpr(5_000, 0.01).unwrap();
    for w in &words {
        filter.insert(w);
    }

    let mut buf = Vec::new();
    filter.write_to(&mut buf).unwrap();
    let restored = Filter::<str, 2, FastMultiblock32<8>, 4>::from_reader(buf.as_slice()).unwrap();

    assert_eq!(restored.as_bytes(), filter.as_bytes());
    for p in words.iter().chain(&probes) {
        assert_eq!(restored.may_contain(p), filter.may_contain(p));
    }
}

#[test]
fn load_into_wrong_capacity_is_recoverable() {
    let mut filter = Filter::<u64, 3>::with_capacity(8_000).unwrap();
    filter.insert(&1);
    let bytes = filter.to_bytes();

    let mut target = Filter::<u64, 3>::with_capacity(16_000).unwrap();
    let err = target.load_bytes(&bytes).unwrap_err();
    assert!(err.is_serialization_error());

    target.reset(8_000).unwrap();
    target.load_bytes(&bytes).unwrap();
    assert!(target.may_contain(&1));
}

#[cfg(feature = "serde")]
#[test]
fn serde_json_roundtrip() {
    let words = random_strings(11, 1_000);
    let mut filter = Filter::<str, 1, Multiblock<u64, 8>>::with_fpr(1_000, 0.02).unwrap();
    for w in &words {
        filter.insert(w);
    }

    let json = serde_json::to_string(&filter).unwrap();
    let restored: Filter<str, 1, Multiblock<u64, 8>> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, filter);
    assert!(words.iter().all(|w| restored.may_contain(w)));
}

#[test]
fn hello_boost_scenario() {
    let mut filter = Filter::<str, 5>::with_capacity(1_000_000).unwrap();
    filter.insert("hello");
    filter.insert("Boost");
    assert!(filter.may_contain("hello"));
    assert!(filter.may_contain("Boost"));

    let probes: HashSet<String> = random_strings(14, 100_000)
        .into_iter()
        .filter(|s| s != "hello" && s != "Boost")
        .collect();
    let hits = probes.iter().filter(|s| filter.may_contain(s)).count();
    let observed = hits as f64 / probes.len() as f64;
    let modelled = Filter::<str, 5>::fpr_for(2, 1_000_000);
    assert!(observed <= modelled * 4.0, "observed {observed}, modelled {modelled}");
}

#[test]
fn hello_boost_in_loaded_filter() {
    let mut filter = Filter::<String, 5>::with_capacity(1_000_000).unwrap();
    filter.insert(&"hello".to_string());
    filter.insert(&"Boost".to_string());

    let inserted = random_strings(12, 100_000);
    for s in &inserted {
        filter.insert(s);
    }

    assert!(filter.may_contain(&"hello".to_string()));
    assert!(filter.may_contain(&"Boost".to_string()));
    for s in &inserted {
        assert!(filter.may_contain(s));
    }

    // 10 bits per element with K = 5: the model predicts just under 1%
    let known: HashSet<&String> = inserted.iter().collect();
    let probes: Vec<String> = random_strings(13, 50_000)
        .into_iter()
        .filter(|s| !known.contains(s))
        .collect();
    let hits = probes.iter().filter(|s| filter.may_contain(s)).count();
    let observed = hits as f64 / probes.len() as f64;
    let modelled = filter.estimated_fpr(100_002);
    assert!(observed < modelled * 1.5 + 0.002, "observed {observed}, modelled {modelled}");

    filter.clear();
    assert!(!filter.may_contain(&"hello".to_string()));
    assert!(!filter.may_contain(&"Boost".to_string()));
    assert_eq!(filter.count_ones(), 0);
}

#[test]
fn reset_with_fpr_resizes() {
    let mut filter = Filter::<u64, 1, FastMultiblock32<8>>::new();
    assert_eq!(filter.capacity(), 0);

    filter.reset_with_fpr(10_000, 0.001).unwrap();
    assert_eq!(
        filter.capacity(),
        Filter::<u64, 1, FastMultiblock32<8>>::capacity_for(10_000, 0.001).unwrap()
    );
    assert_no_false_negatives(filter, &random_keys(14, 10_000));
}
