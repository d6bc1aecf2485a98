//! Run with:
//! ```bash
//! RUSTFLAGS="-C target-cpu=native" cargo bench --bench benchmark
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

use helsing::fingerprint::{fingerprint, FingerprintCache, Narrow, Wide};
use helsing::kernel::{self, NoopSink};
use helsing::result_list::ResultList;
use helsing::tree::ProductTree;

/// Fixed RNG seed for reproducible benchmarks.
const SEED: u64 = 0xDEAD_BEEF_CAFE_BABE;

/// Measures the fingerprint cache build for the 4-digit (fang length 2)
/// product range used throughout the other benchmarks.
fn bench_cache_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_build");
    group.bench_function("wide_len4", |b| {
        b.iter(|| black_box(FingerprintCache::<Wide>::new(black_box(4))))
    });
    group.bench_function("narrow_len4", |b| {
        b.iter(|| black_box(FingerprintCache::<Narrow>::new(black_box(4))))
    });
    group.finish();
}

/// The core hot path: the full fang-enumeration kernel over one subrange.
fn bench_kernel_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_enumerate");

    for &(p_min, p_max, fmax, label) in &[
        (1_000u64, 9_999u64, 99u64, "4digit"),
        (100_000, 999_999, 999, "6digit"),
        (10_000_000, 99_999_999, 9999, "8digit"),
    ] {
        let length = label.trim_end_matches("digit").parse::<u32>().unwrap();
        let cache = FingerprintCache::<Wide>::new(length);
        group.throughput(Throughput::Elements((p_max - p_min) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &(), |b, _| {
            b.iter(|| {
                let mut tree = ProductTree::new();
                let mut pending = ResultList::new();
                let mut sink = NoopSink;
                kernel::enumerate(
                    black_box(p_min),
                    black_box(p_max),
                    black_box(fmax),
                    &cache,
                    1,
                    &mut tree,
                    &mut pending,
                    &mut sink,
                );
                black_box(pending.len())
            })
        });
    }
    group.finish();
}

/// Fingerprint computation alone, on random fang-width inputs — isolates the
/// codec's per-call cost from the kernel's loop-carried bookkeeping.
fn bench_fingerprint(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(SEED);
    let values: Vec<u64> = (0..10_000).map(|_| rng.gen_range(0..1_000_000)).collect();

    let mut group = c.benchmark_group("fingerprint");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("wide", |b| {
        b.iter(|| {
            for &v in &values {
                black_box(fingerprint::<Wide>(v));
            }
        })
    });
    group.bench_function("narrow", |b| {
        b.iter(|| {
            for &v in &values {
                black_box(fingerprint::<Narrow>(v));
            }
        })
    });
    group.finish();
}

/// AVL tree insert throughput under a realistic jumbled insertion order.
fn bench_tree_insert(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(SEED);
    let values: Vec<u64> = (0..20_000).map(|_| rng.gen_range(0..1_000_000)).collect();

    let mut group = c.benchmark_group("tree_insert");
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("jumbled_20k", |b| {
        b.iter_batched(
            ProductTree::new,
            |mut tree| {
                for &v in &values {
                    tree.insert(black_box(v));
                }
                tree
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_cache_build,
    bench_kernel_enumerate,
    bench_fingerprint,
    bench_tree_insert,
);
criterion_main!(benches);
