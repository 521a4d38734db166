//! Full-pipeline benchmarks.
//!
//! The live graph for every preset, plus the offline renderer.

mod graph;
mod offline;

pub use graph::bench_graph;
pub use offline::bench_offline;
