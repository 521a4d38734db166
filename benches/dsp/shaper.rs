//! Benchmarks for waveshaping curves.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use humline::dsp::shaper::{Curve, Waveshaper};

use crate::BLOCK_SIZES;

pub fn bench_shaper(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/shaper");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        // Tape saturation, single rate
        let mut shaper = Waveshaper::new(Curve::saturation(0.6));
        group.bench_with_input(BenchmarkId::new("tanh", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                shaper.render(black_box(&mut buffer));
            })
        });

        // Arc hard clip at 4x
        let mut shaper = Waveshaper::oversampled(Curve::HardClip);
        group.bench_with_input(BenchmarkId::new("hard_clip_4x", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                shaper.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
