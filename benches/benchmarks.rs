//! Benchmarks for streamfreq
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use streamfreq::frequency::CountSketch;
use streamfreq::traits::Sketch;

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_sketch/add");
    group.throughput(Throughput::Elements(1));

    for depth in [4, 8] {
        group.bench_function(format!("bytes_d{}", depth), |b| {
            let mut cs = CountSketch::with_dimensions(16_384, depth);
            let mut i = 0u64;
            b.iter(|| {
                cs.add(i.to_string().as_bytes(), 1).unwrap();
                i = i.wrapping_add(1);
            });
        });

        group.bench_function(format!("int_d{}", depth), |b| {
            let mut cs = CountSketch::with_dimensions(16_384, depth);
            let mut i = 0i64;
            b.iter(|| {
                cs.add_int(i, 1).unwrap();
                i = i.wrapping_add(1);
            });
        });
    }

    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_sketch/estimate");
    group.throughput(Throughput::Elements(1));

    let mut cs = CountSketch::with_dimensions(16_384, 5);
    for i in 0..100_000i64 {
        cs.add_int(i, 1).unwrap();
        cs.add(i.to_string().as_bytes(), 1).unwrap();
    }

    group.bench_function("bytes", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let est = cs.estimate(i.to_string().as_bytes());
            i = i.wrapping_add(1);
            black_box(est)
        });
    });

    group.bench_function("int", |b| {
        let mut i = 0i64;
        b.iter(|| {
            let est = cs.estimate_int(i);
            i = i.wrapping_add(1);
            black_box(est)
        });
    });

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_sketch/merge");

    let mut a = CountSketch::with_seed(16_384, 5, 1);
    let mut b2 = CountSketch::with_seed(16_384, 5, 1);
    for i in 0..10_000i64 {
        a.add_int(i, 1).unwrap();
        b2.add_int(i + 10_000, 1).unwrap();
    }

    group.bench_function("pairwise", |bench| {
        bench.iter(|| {
            let mut m = a.clone();
            m.merge(black_box(&b2)).unwrap();
            black_box(m)
        });
    });

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_sketch/codec");

    let mut cs = CountSketch::with_dimensions(16_384, 5);
    for i in 0..10_000i64 {
        cs.add_int(i, 1).unwrap();
    }
    let bytes = cs.to_bytes();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("encode", |b| {
        b.iter(|| black_box(cs.to_bytes()));
    });

    group.bench_function("decode", |b| {
        b.iter(|| black_box(CountSketch::from_bytes(&bytes).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_add, bench_estimate, bench_merge, bench_codec);
criterion_main!(benches);
