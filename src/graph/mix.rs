use crate::dsp::ramp::LinearRamp;
use crate::graph::node::{Lanes, RenderCtx, Stage};
use crate::params::{ParamId, UNIT_RANGE};

/*
Mixer
=====

    base(t) = clamp(hum(t) · mask(t) + noiseGain · spark(t), -1, 1)

The hum only gets through while the contact is closed; the spark term is
added regardless of the mask, so an open contact still crackles as it moves.
The offline renderer runs the same formula with noiseGain fixed at 1.
*/

/// One mixed sample, clamped to [-1, 1].
#[inline]
pub fn mix_sample(hum: f32, mask: f32, spark: f32, noise_gain: f32) -> f32 {
    (hum * mask + noise_gain * spark).clamp(-1.0, 1.0)
}

pub struct Mixer {
    noise_gain: LinearRamp,
}

impl Mixer {
    pub fn new(noise_gain: f32) -> Self {
        Self {
            noise_gain: LinearRamp::new(UNIT_RANGE.clamp(noise_gain)),
        }
    }

    pub fn noise_gain(&self) -> f32 {
        self.noise_gain.value()
    }
}

impl Stage for Mixer {
    fn process(&mut self, lanes: &mut Lanes, _ctx: &RenderCtx) {
        let n = lanes.len();
        for i in 0..n {
            let gain = self.noise_gain.next_value();
            lanes.main[i] = mix_sample(lanes.hum[i], lanes.mask[i], lanes.spark[i], gain);
        }
    }

    fn set_param(&mut self, id: ParamId, value: f32, ramp_samples: usize) {
        if id == ParamId::NoiseGain {
            self.noise_gain
                .set_target(UNIT_RANGE.clamp(value), ramp_samples);
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "mixer"
    }
}
