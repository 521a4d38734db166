//! Low-level DSP primitives used by the graph stages and the offline renderer.
//!
//! These components are allocation-free and realtime-safe once constructed,
//! so the live graph can own them directly. Both the live graph and the
//! offline renderer draw on the same math here, which keeps the two paths
//! from drifting apart where they are meant to agree.

/// Fractional delay line for wow/flutter.
pub mod delay;
/// Streaming and batch envelope followers.
pub mod envelope;
/// State-variable filter (arc path high-pass).
pub mod filter;
/// Injectable random sources: uniform, centred uniform, Gaussian.
pub mod noise;
/// Phase-accumulating sine oscillator.
pub mod oscillator;
/// Linear parameter ramps.
pub mod ramp;
/// Saturation and hard-clip waveshaping.
pub mod shaper;
/// Connection gate, friction and sparks.
pub mod transient;

pub use envelope::{BatchEnvelope, EnvelopeFollower, StreamingEnvelope};
pub use ramp::LinearRamp;
