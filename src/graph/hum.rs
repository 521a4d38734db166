use crate::dsp::oscillator::SineOsc;
use crate::dsp::ramp::LinearRamp;
use crate::graph::node::{Lanes, RenderCtx, Stage};
use crate::params::{ParamId, ParameterSet, UNIT_RANGE};

/*
Harmonic Bank
=============

Mains hum: the 60 Hz fundamental plus the 2nd, 3rd and 5th harmonics,

    hum(t) = g60·sin(2π·60t) + g120·sin(2π·120t) + g180·sin(2π·180t) + g300·sin(2π·300t)

each partial with its own gain in [0, 1]. Everything sits far below Nyquist
at any usable sample rate, so no band-limiting is needed.

The offline renderer uses the same bank with the gains fixed to
humGain · (1.0, 0.4, 0.3, 0.2).
*/

pub const HUM_FREQUENCIES: [f32; 4] = [60.0, 120.0, 180.0, 300.0];

/// Partial weights used by the offline renderer, relative to `humGain`.
pub const OFFLINE_HUM_WEIGHTS: [f32; 4] = [1.0, 0.4, 0.3, 0.2];

pub struct HarmonicBank {
    oscillators: [SineOsc; 4],
    gains: [LinearRamp; 4],
}

impl HarmonicBank {
    pub fn new(gains: [f32; 4]) -> Self {
        Self {
            oscillators: [SineOsc::new(); 4],
            gains: gains.map(|g| LinearRamp::new(UNIT_RANGE.clamp(g))),
        }
    }

    pub fn from_params(params: &ParameterSet) -> Self {
        Self::new([
            params.hum_gain,
            params.hum120_gain,
            params.hum180_gain,
            params.hum300_gain,
        ])
    }

    /// Bank with the offline partial weights scaled by `hum_gain`.
    pub fn offline(hum_gain: f32) -> Self {
        Self::new(OFFLINE_HUM_WEIGHTS.map(|w| w * hum_gain))
    }

    pub fn gain(&self, partial: usize) -> f32 {
        self.gains[partial].value()
    }

    /// Next summed hum sample.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let mut acc = 0.0;
        for ((osc, gain), &freq) in self
            .oscillators
            .iter_mut()
            .zip(self.gains.iter_mut())
            .zip(HUM_FREQUENCIES.iter())
        {
            acc += gain.next_value() * osc.next_sample(freq, sample_rate);
        }
        acc
    }

    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(sample_rate);
        }
    }

    fn partial_for(id: ParamId) -> Option<usize> {
        match id {
            ParamId::HumGain => Some(0),
            ParamId::Hum120Gain => Some(1),
            ParamId::Hum180Gain => Some(2),
            ParamId::Hum300Gain => Some(3),
            _ => None,
        }
    }
}

impl Stage for HarmonicBank {
    fn process(&mut self, lanes: &mut Lanes, ctx: &RenderCtx) {
        let n = lanes.len();
        self.render(&mut lanes.hum[..n], ctx.sample_rate);
    }

    fn set_param(&mut self, id: ParamId, value: f32, ramp_samples: usize) {
        if let Some(partial) = Self::partial_for(id) {
            self.gains[partial].set_target(UNIT_RANGE.clamp(value), ramp_samples);
        }
    }

    fn reset(&mut self) {
        for osc in &mut self.oscillators {
            osc.reset();
        }
    }

    fn name(&self) -> &'static str {
        "harmonic-bank"
    }
}
