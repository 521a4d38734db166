//! Benchmarks for the offline renderer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use humline::{OfflineRenderer, RenderConfig};

pub fn bench_offline(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/offline");
    group.sample_size(20);

    for &seconds in &[1.0f32, 5.0] {
        let config = RenderConfig {
            duration_seconds: seconds,
            ..RenderConfig::default()
        };
        let renderer = OfflineRenderer::new(config).with_seed(3);
        group.bench_with_input(
            BenchmarkId::new("render_seconds", seconds as u32),
            &seconds,
            |b, _| b.iter(|| black_box(renderer.render())),
        );

        let output = renderer.render();
        if let Ok(output) = output {
            group.bench_with_input(
                BenchmarkId::new("encode_wav_seconds", seconds as u32),
                &seconds,
                |b, _| b.iter(|| black_box(output.to_wav())),
            );
        }
    }

    group.finish();
}
