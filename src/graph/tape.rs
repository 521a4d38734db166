use crate::dsp::delay::DelayLine;
use crate::dsp::oscillator::SineOsc;
use crate::dsp::ramp::LinearRamp;
use crate::dsp::shaper::{Curve, Waveshaper};
use crate::graph::node::{Lanes, RenderCtx, Stage};
use crate::params::{ParamId, UNIT_RANGE};
use crate::ms_to_samples;

/*
Tape Emulator
=============

Two things a worn tape machine does to a signal:

1. Wow / flutter: the transport speed drifts, so the playback head reads
   slightly early or late. Modelled as a delay line whose read position is
   swept by a slow sine LFO:

       delay(t) = 5 ms + lfo(t) · depth · 2 ms
       lfo(t)   = sin(2π · 1.5 Hz · t)

   A moving read head is a moving pitch: the signal bends sharp as the delay
   shrinks and flat as it grows. With depth = 1 the delay swings between
   3 ms and 7 ms.

2. Saturation: the delayed signal goes through `Curve::saturation(amount)`
   (tanh soft clipping, identity below 0.01).

The delay buffer holds 100 ms so the read head never catches up with the
write head, whatever the sample rate.
*/

pub const TAPE_BASE_DELAY_MS: f32 = 5.0;
pub const TAPE_MOD_DEPTH_MS: f32 = 2.0;
pub const TAPE_LFO_HZ: f32 = 1.5;
pub const TAPE_MAX_DELAY_MS: f32 = 100.0;

pub struct TapeEmulator {
    delay: DelayLine,
    lfo: SineOsc,
    depth: LinearRamp,
    shaper: Waveshaper,
}

impl TapeEmulator {
    pub fn new(wow_flutter_depth: f32, saturation: f32, sample_rate: f32) -> Self {
        Self {
            delay: DelayLine::new(ms_to_samples(TAPE_MAX_DELAY_MS, sample_rate)),
            lfo: SineOsc::new(),
            depth: LinearRamp::new(UNIT_RANGE.clamp(wow_flutter_depth)),
            shaper: Waveshaper::new(Curve::saturation(UNIT_RANGE.clamp(saturation))),
        }
    }

    pub fn curve(&self) -> Curve {
        self.shaper.curve()
    }

    pub fn depth(&self) -> f32 {
        self.depth.value()
    }

    /// Delay in samples for one LFO value and depth.
    #[inline]
    pub fn delay_samples(lfo: f32, depth: f32, sample_rate: f32) -> f32 {
        let ms = TAPE_BASE_DELAY_MS + lfo * depth * TAPE_MOD_DEPTH_MS;
        ms * sample_rate / 1000.0
    }

    #[inline]
    pub fn next_sample(&mut self, x: f32, sample_rate: f32) -> f32 {
        let lfo = self.lfo.next_sample(TAPE_LFO_HZ, sample_rate);
        let depth = self.depth.next_value();
        let delayed = self
            .delay
            .next_sample(x, Self::delay_samples(lfo, depth, sample_rate));
        self.shaper.next_sample(delayed)
    }
}

impl Stage for TapeEmulator {
    fn process(&mut self, lanes: &mut Lanes, ctx: &RenderCtx) {
        let n = lanes.len();
        for sample in lanes.main[..n].iter_mut() {
            *sample = self.next_sample(*sample, ctx.sample_rate);
        }
    }

    fn set_param(&mut self, id: ParamId, value: f32, ramp_samples: usize) {
        match id {
            ParamId::WowFlutterDepth => {
                self.depth.set_target(UNIT_RANGE.clamp(value), ramp_samples);
            }
            // Curve swap, applied at the block boundary
            ParamId::Saturation => {
                self.shaper
                    .set_curve(Curve::saturation(UNIT_RANGE.clamp(value)));
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.delay.reset();
        self.lfo.reset();
        self.shaper.reset();
    }

    fn name(&self) -> &'static str {
        "tape-emulator"
    }
}
