//! Benchmarks for the vector kernels.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cpuprobe_core::compute::bits::{deposit, extract};
use cpuprobe_core::compute::{get_dispatcher, ScalarKernels, VectorKernels, WideKernels};

fn benchmark_add_f32(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_f32");

    for size in [100, 1000, 10000].iter() {
        let a: Vec<f32> = (0..*size).map(|i| i as f32).collect();
        let b = vec![2.0_f32; *size];
        let mut out = vec![0.0_f32; *size];

        let scalar = ScalarKernels::new();
        group.bench_with_input(BenchmarkId::new("scalar", size), size, |bench, _| {
            bench.iter(|| {
                scalar.add_f32(&a, &b, &mut out).unwrap();
                black_box(&out);
            });
        });

        let wide = WideKernels::new();
        group.bench_with_input(BenchmarkId::new("wide", size), size, |bench, _| {
            bench.iter(|| {
                wide.add_f32(&a, &b, &mut out).unwrap();
                black_box(&out);
            });
        });

        let dispatcher = get_dispatcher();
        group.bench_with_input(BenchmarkId::new("dispatch", size), size, |bench, _| {
            bench.iter(|| {
                dispatcher.add_f32(&a, &b, &mut out).unwrap();
                black_box(&out);
            });
        });
    }

    group.finish();
}

fn benchmark_add_i32(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_i32");

    for size in [100, 10000].iter() {
        let a: Vec<i32> = (0..*size as i32).collect();
        let b = vec![i32::MAX; *size];
        let mut out = vec![0; *size];

        let scalar = ScalarKernels::new();
        group.bench_with_input(BenchmarkId::new("scalar", size), size, |bench, _| {
            bench.iter(|| {
                scalar.add_i32(&a, &b, &mut out).unwrap();
                black_box(&out);
            });
        });

        let wide = WideKernels::new();
        group.bench_with_input(BenchmarkId::new("wide", size), size, |bench, _| {
            bench.iter(|| {
                wide.add_i32(&a, &b, &mut out).unwrap();
                black_box(&out);
            });
        });
    }

    group.finish();
}

fn benchmark_xor_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("xor_fold");

    for size in [256, 4096, 65536].iter() {
        let data: Vec<u8> = (0..*size).map(|i| (i % 251) as u8).collect();

        group.bench_with_input(BenchmarkId::new("scalar", size), size, |bench, _| {
            let scalar = ScalarKernels::new();
            bench.iter(|| black_box(scalar.xor_fold(&data)));
        });

        group.bench_with_input(BenchmarkId::new("wide", size), size, |bench, _| {
            let wide = WideKernels::new();
            bench.iter(|| black_box(wide.xor_fold(&data)));
        });
    }

    group.finish();
}

fn benchmark_bits(c: &mut Criterion) {
    let mask = 0xAAAA_AAAA_AAAA_AAAA_u64;
    c.bench_function("deposit", |bench| {
        bench.iter(|| black_box(deposit(black_box(0xDEAD_BEEF), mask)))
    });
    c.bench_function("extract", |bench| {
        bench.iter(|| black_box(extract(black_box(u64::MAX), mask)))
    });
}

criterion_group!(
    benches,
    benchmark_add_f32,
    benchmark_add_i32,
    benchmark_xor_fold,
    benchmark_bits
);
criterion_main!(benches);
