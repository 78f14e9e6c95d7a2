//! Shared data generators and constants for all benchmarks.
#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Element counts the filters are sized for.
pub const SIZES: &[usize] = &[10_000, 1_000_000, 10_000_000];

/// Target false positive rate for sized filters.
pub const FPR: f64 = 0.01;

/// Deterministic random keys.
pub fn generate_keys(count: usize, seed: u64) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen()).collect()
}

/// Deterministic random alphanumeric strings of length `len`.
pub fn generate_strings(count: usize, len: usize, seed: u64) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (&mut rng).sample_iter(&Alphanumeric).take(len).map(char::from).collect())
        .collect()
}
