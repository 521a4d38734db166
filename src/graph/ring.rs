use crate::dsp::oscillator::SineOsc;
use crate::dsp::ramp::LinearRamp;
use crate::graph::node::{Lanes, RenderCtx, Stage};
use crate::params::{ParamId, CARRIER_FREQ_RANGE};

/*
Ring Modulator
==============

Multiplies the signal by a sine carrier, which replaces every input partial
f with the sidebands (carrier - f) and (carrier + f). The 60 Hz hum family
turns into clangorous, radio-like pairs around the carrier: the "ghost in
the radio".

    c(t)   = sin(2π · carrierFreq · t)
    out(t) = dry · x(t) + wet · x(t) · c(t)

    enabled:   dry = 0.3, wet = 0.7
    disabled:  dry = 1.0, wet = 0.0

Toggling ramps dry and wet over the usual 50 ms instead of switching, and
carrier frequency changes glide the same way. The carrier keeps running
while the effect is disabled so re-enabling it does not restart its phase.
*/

pub const RING_DRY_ENABLED: f32 = 0.3;
pub const RING_WET_ENABLED: f32 = 0.7;

fn mix_levels(enabled: bool) -> (f32, f32) {
    if enabled {
        (RING_DRY_ENABLED, RING_WET_ENABLED)
    } else {
        (1.0, 0.0)
    }
}

pub struct RingModulator {
    carrier: SineOsc,
    carrier_freq: LinearRamp,
    dry: LinearRamp,
    wet: LinearRamp,
}

impl RingModulator {
    pub fn new(enabled: bool, carrier_freq: f32) -> Self {
        let (dry, wet) = mix_levels(enabled);
        Self {
            carrier: SineOsc::new(),
            carrier_freq: LinearRamp::new(CARRIER_FREQ_RANGE.clamp(carrier_freq)),
            dry: LinearRamp::new(dry),
            wet: LinearRamp::new(wet),
        }
    }

    pub fn levels(&self) -> (f32, f32) {
        (self.dry.value(), self.wet.value())
    }

    pub fn carrier_freq(&self) -> f32 {
        self.carrier_freq.value()
    }

    #[inline]
    pub fn next_sample(&mut self, x: f32, sample_rate: f32) -> f32 {
        let freq = self.carrier_freq.next_value();
        let c = self.carrier.next_sample(freq, sample_rate);
        let dry = self.dry.next_value();
        let wet = self.wet.next_value();
        dry * x + wet * (x * c)
    }
}

impl Stage for RingModulator {
    fn process(&mut self, lanes: &mut Lanes, ctx: &RenderCtx) {
        let n = lanes.len();
        for sample in lanes.main[..n].iter_mut() {
            *sample = self.next_sample(*sample, ctx.sample_rate);
        }
    }

    fn set_param(&mut self, id: ParamId, value: f32, ramp_samples: usize) {
        match id {
            ParamId::RingModEnabled => {
                let (dry, wet) = mix_levels(value >= 0.5);
                self.dry.set_target(dry, ramp_samples);
                self.wet.set_target(wet, ramp_samples);
            }
            ParamId::CarrierFreq => {
                self.carrier_freq
                    .set_target(CARRIER_FREQ_RANGE.clamp(value), ramp_samples);
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.carrier.reset();
    }

    fn name(&self) -> &'static str {
        "ring-modulator"
    }
}
