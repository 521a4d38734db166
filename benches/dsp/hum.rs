//! Benchmarks for the harmonic bank.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use humline::graph::HarmonicBank;

use crate::BLOCK_SIZES;

pub fn bench_hum(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/hum");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut bank = HarmonicBank::new([0.5, 0.2, 0.15, 0.1]);
        group.bench_with_input(BenchmarkId::new("four_partials", size), &size, |b, _| {
            b.iter(|| bank.render(black_box(&mut buffer), black_box(48_000.0)))
        });
    }

    group.finish();
}
