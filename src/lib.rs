//! Stochastic interference synthesizer.
//!
//! Models an analog electrical-contact artifact (mains hum, intermittent
//! connection noise, arcing sparks, tape wobble and saturation) two ways:
//! as a live, parameter-steerable block graph driven by an audio device, and
//! as a single-threaded offline renderer producing a full buffer and a WAV
//! file.

pub mod dsp; // Allocation-free signal primitives
pub mod engine; // Live runtime: device, channels, lifecycle
pub mod error;
pub mod graph; // Block-processing stages and the ordered pipeline
pub mod params;
pub mod render; // Offline renderer, WAV encoding, live-graph bounce

pub use engine::{EngineState, LiveEngine};
pub use error::{EngineError, Result};
pub use params::ParameterSet;
pub use render::{OfflineRenderer, RenderConfig, RenderOutput};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Length of the linear ramp applied to continuous parameters.
pub const RAMP_MS: f32 = 50.0;

/// Samples between two telemetry publications from the audio thread.
pub const TELEMETRY_INTERVAL: usize = 128;

/// Window length of the analysis tap (time and frequency domain).
pub const ANALYSIS_SIZE: usize = 2048;

/// Converts a duration in milliseconds to a whole number of samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms / 1000.0) * sample_rate).round().max(0.0) as usize
}
