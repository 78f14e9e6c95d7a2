//! Raw subfilter kernels on a cache-resident bit array.
//!
//! Isolates `mark` / `check` from hashing and position generation, so the
//! SIMD kernels can be compared directly with the scalar ones they mirror.

use blockbloom::core::BitArray;
use blockbloom::subfilter::{Block, FastMultiblock32, FastMultiblock64, Multiblock, Subfilter};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

mod common;
use common::generate_keys;

const ARRAY_BITS: usize = 32 * 1024 * 8;

fn bench_pair<S: Subfilter>(c: &mut Criterion, name: &str) {
    let hashes = generate_keys(4096, 7);
    let slots = ARRAY_BITS / 8 / S::REGION_BYTES;
    let mut bits = BitArray::new(ARRAY_BITS).expect("bit array");

    let mut group = c.benchmark_group(name);
    group.throughput(Throughput::Elements(1));

    let mut idx = 0usize;
    group.bench_function("mark", |b| {
        b.iter(|| {
            let h = hashes[idx % hashes.len()];
            let offset = (idx % slots) * S::REGION_BYTES;
            S::mark(&mut bits, black_box(offset), black_box(h));
            idx += 1;
        })
    });

    group.bench_function("check", |b| {
        b.iter(|| {
            let h = hashes[idx % hashes.len()];
            let offset = (idx % slots) * S::REGION_BYTES;
            idx += 1;
            S::check(&bits, black_box(offset), black_box(h))
        })
    });
    group.finish();
}

fn bench_subfilters(c: &mut Criterion) {
    bench_pair::<Block<u64, 8>>(c, "block_u64x8");
    bench_pair::<Multiblock<u32, 8>>(c, "multiblock_u32x8");
    bench_pair::<FastMultiblock32<8>>(c, "fast32x8");
    bench_pair::<Multiblock<u32, 11>>(c, "multiblock_u32x11");
    bench_pair::<FastMultiblock32<11>>(c, "fast32x11");
    bench_pair::<Multiblock<u64, 8>>(c, "multiblock_u64x8");
    bench_pair::<FastMultiblock64<8>>(c, "fast64x8");
}

criterion_group!(benches, bench_subfilters);
criterion_main!(benches);
