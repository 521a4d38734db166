//! Benchmarks for the streaming and batch envelope followers.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use humline::dsp::envelope::{BatchEnvelope, EnvelopeFollower, StreamingEnvelope};
use humline::dsp::noise::{rng_from_seed, uniform};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let mut rng = rng_from_seed(Some(1));

    for &size in BLOCK_SIZES {
        let raw: Vec<f32> = (0..size).map(|_| uniform(&mut rng)).collect();
        let mut out = vec![0.0f32; size];

        // Short window (smoothness 50 -> 5 samples)
        let mut env = StreamingEnvelope::new(50.0);
        group.bench_with_input(BenchmarkId::new("streaming_short", size), &size, |b, _| {
            b.iter(|| env.follow(black_box(&raw), black_box(&mut out)))
        });

        // Longest window (smoothness 2000 -> 200 samples)
        let mut env = StreamingEnvelope::new(2000.0);
        group.bench_with_input(BenchmarkId::new("streaming_long", size), &size, |b, _| {
            b.iter(|| env.follow(black_box(&raw), black_box(&mut out)))
        });
    }

    // Batch works on whole renders, not blocks
    for &seconds in &[1usize, 10] {
        let len = 48_000 * seconds;
        let raw: Vec<f32> = (0..len).map(|_| uniform(&mut rng)).collect();
        let mut out = vec![0.0f32; len];
        let mut env = BatchEnvelope::new(500.0);
        group.bench_with_input(BenchmarkId::new("batch_seconds", seconds), &len, |b, _| {
            b.iter(|| env.follow(black_box(&raw), black_box(&mut out)))
        });
    }

    group.finish();
}
