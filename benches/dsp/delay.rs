//! Benchmarks for the fractional delay line and tape emulator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use humline::dsp::delay::DelayLine;
use humline::graph::TapeEmulator;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.01).sin()).collect();
        let mut buffer = input.clone();

        // Fixed fractional delay
        let mut delay = DelayLine::new(4_800);
        group.bench_with_input(BenchmarkId::new("fractional", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    *out = delay.next_sample(black_box(x), black_box(240.5));
                }
            })
        });

        // LFO-swept delay plus saturation
        let mut tape = TapeEmulator::new(1.0, 0.5, sample_rate);
        group.bench_with_input(BenchmarkId::new("tape", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    *out = tape.next_sample(black_box(x), sample_rate);
                }
            })
        });
    }

    group.finish();
}
