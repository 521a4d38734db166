//! Block-processing stages and the ordered interference pipeline.
//!
//! Each stage wraps DSP primitives from [`crate::dsp`] behind the [`Stage`]
//! trait and reads/writes named lanes of a shared [`Lanes`] block. The
//! [`InterferenceGraph`] owns one instance of every stage in a fixed order:
//!
//! ```text
//!   Contact ─► HarmonicBank ─► Mixer ─► RingModulator ─┬─► TapeEmulator ─┬─► MasterBus
//!                                                      └─► ArcPath ──────┘
//! ```
//!
//! ArcPath runs before TapeEmulator in the list so it sees `main` before the
//! tape rewrites it; the two branches meet again at the master bus.

/// Parallel high-pass + hard-clip branch.
pub mod arc;
/// Streaming envelope, connection gate and sparks.
pub mod contact;
/// 60/120/180/300 Hz additive hum.
pub mod hum;
/// Final gain, clamp and analysis feed.
pub mod master;
/// Gated hum plus ungated sparks.
pub mod mix;
/// Core traits shared by all stages.
pub mod node;
/// Carrier ring modulation with dry/wet blend.
pub mod ring;
/// Wow/flutter delay and tape saturation.
pub mod tape;

use crate::engine::analysis::AnalysisFeed;
use crate::engine::channel::TelemetrySender;
use crate::params::ParameterSet;
use crate::{ms_to_samples, MAX_BLOCK_SIZE, RAMP_MS, TELEMETRY_INTERVAL};

pub use arc::ArcPath;
pub use contact::ContactStage;
pub use hum::HarmonicBank;
pub use master::MasterBus;
pub use mix::Mixer;
pub use node::{Lanes, RenderCtx, Stage};
pub use ring::RingModulator;
pub use tape::TapeEmulator;

/// Contact state sampled on the audio thread for the control side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Telemetry {
    /// Streaming envelope, [0, 1]
    pub envelope: f32,
    /// Connection mask, 0.0 or 1.0
    pub mask: f32,
}

impl Telemetry {
    pub fn connected(&self) -> bool {
        self.mask > 0.5
    }
}

/// The live interference graph.
///
/// Everything is allocated in the constructor. `render_block` and `apply`
/// never allocate, lock or block, so both are safe to call from the audio
/// callback.
pub struct InterferenceGraph {
    stages: Vec<Box<dyn Stage>>,
    lanes: Lanes,
    params: ParameterSet,
    ctx: RenderCtx,
    ramp_samples: usize,
    telemetry: Option<TelemetrySender>,
    telemetry_offset: usize,
    last_telemetry: Telemetry,
}

impl InterferenceGraph {
    pub fn new(params: ParameterSet, sample_rate: f32, seed: Option<u64>) -> Self {
        Self::build(params, sample_rate, seed, None)
    }

    /// Graph whose master bus also feeds `tap` with every output sample.
    pub fn with_tap(
        params: ParameterSet,
        sample_rate: f32,
        seed: Option<u64>,
        tap: AnalysisFeed,
    ) -> Self {
        Self::build(params, sample_rate, seed, Some(tap))
    }

    fn build(
        params: ParameterSet,
        sample_rate: f32,
        seed: Option<u64>,
        tap: Option<AnalysisFeed>,
    ) -> Self {
        let params = params.clamped();

        let mut master = MasterBus::new(params.master_volume);
        master.set_tap(tap);

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(ContactStage::new(&params, seed)),
            Box::new(HarmonicBank::from_params(&params)),
            Box::new(Mixer::new(params.noise_gain)),
            Box::new(RingModulator::new(
                params.ring_mod_enabled,
                params.carrier_freq,
            )),
            Box::new(ArcPath::new(params.spark_gain)),
            Box::new(TapeEmulator::new(
                params.wow_flutter_depth,
                params.saturation,
                sample_rate,
            )),
            Box::new(master),
        ];

        Self {
            stages,
            lanes: Lanes::new(),
            params,
            ctx: RenderCtx::new(sample_rate),
            ramp_samples: ms_to_samples(RAMP_MS, sample_rate),
            telemetry: None,
            telemetry_offset: TELEMETRY_INTERVAL - 1,
            last_telemetry: Telemetry::default(),
        }
    }

    pub fn set_telemetry(&mut self, sender: Option<TelemetrySender>) {
        self.telemetry = sender;
    }

    /// Parameters currently in effect (clamped).
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate
    }

    /// Samples rendered since construction or the last reset.
    pub fn frame(&self) -> u64 {
        self.ctx.frame
    }

    pub fn ramp_samples(&self) -> usize {
        self.ramp_samples
    }

    pub fn last_telemetry(&self) -> Telemetry {
        self.last_telemetry
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|s| s.name())
    }

    /// Install a new snapshot.
    ///
    /// Only the controls that differ from the current snapshot are forwarded.
    /// Continuous controls start a ramp; discrete ones switch now, which is
    /// the next block boundary when called between `render_block` calls.
    pub fn apply(&mut self, params: ParameterSet) {
        let next = params.clamped();

        for id in self.params.diff(&next) {
            let value = next.get(id);
            let ramp = if id.is_continuous() {
                self.ramp_samples
            } else {
                0
            };
            for stage in self.stages.iter_mut() {
                stage.set_param(id, value, ramp);
            }
        }

        self.params = next;
    }

    /// Render `out.len()` mono samples, in chunks of at most `MAX_BLOCK_SIZE`.
    pub fn render_block(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let len = chunk.len();
            self.lanes.begin_block(len);

            for stage in self.stages.iter_mut() {
                stage.process(&mut self.lanes, &self.ctx);
            }

            chunk.copy_from_slice(&self.lanes.main[..len]);
            self.publish_telemetry(len);
            self.ctx.frame += len as u64;
        }
    }

    fn publish_telemetry(&mut self, len: usize) {
        let mut offset = self.telemetry_offset;
        while offset < len {
            let sample = Telemetry {
                envelope: self.lanes.envelope[offset],
                mask: self.lanes.mask[offset],
            };
            self.last_telemetry = sample;
            if let Some(sender) = &self.telemetry {
                sender.publish(sample);
            }
            offset += TELEMETRY_INTERVAL;
        }
        self.telemetry_offset = offset - len;
    }

    /// Phases to zero, buffers emptied, frame counter back to 0.
    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
        self.lanes.clear();
        self.ctx.frame = 0;
        self.telemetry_offset = TELEMETRY_INTERVAL - 1;
        self.last_telemetry = Telemetry::default();
    }
}
