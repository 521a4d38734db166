//! Benchmarks for low-level DSP primitives.

mod delay;
mod envelope;
mod filter;
mod hum;
mod shaper;

pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use hum::bench_hum;
pub use shaper::bench_shaper;
