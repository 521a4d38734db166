//! Benchmarks for the live interference graph.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use humline::graph::InterferenceGraph;
use humline::params::presets::{self, PRESETS};
use humline::ParameterSet;

use crate::BLOCK_SIZES;

pub fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/graph");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for preset in PRESETS.iter() {
            let mut graph = InterferenceGraph::new(preset.params, 48_000.0, Some(7));
            let id = BenchmarkId::new(preset.name.replace(' ', "_").to_lowercase(), size);
            group.bench_with_input(id, &size, |b, _| {
                b.iter(|| graph.render_block(black_box(&mut buffer)))
            });
        }

        // Everything switched on: ring mod, full wobble, heavy saturation
        let heavy = ParameterSet {
            ring_mod_enabled: true,
            wow_flutter_depth: 1.0,
            saturation: 0.8,
            ..presets::HEAVY_CRACKLE
        };
        let mut graph = InterferenceGraph::new(heavy, 48_000.0, Some(7));
        group.bench_with_input(BenchmarkId::new("all_stages", size), &size, |b, _| {
            b.iter(|| graph.render_block(black_box(&mut buffer)))
        });

        // Parameter churn: a new snapshot every block
        let mut graph = InterferenceGraph::new(ParameterSet::default(), 48_000.0, Some(7));
        let mut flip = false;
        group.bench_with_input(BenchmarkId::new("update_every_block", size), &size, |b, _| {
            b.iter(|| {
                flip = !flip;
                let params = if flip {
                    presets::ETHEREAL_DRONE
                } else {
                    presets::UNSTABLE_SIGNAL
                };
                graph.apply(black_box(params));
                graph.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
