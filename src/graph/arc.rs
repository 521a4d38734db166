use crate::dsp::filter::SVFilter;
use crate::dsp::ramp::LinearRamp;
use crate::dsp::shaper::{Curve, Waveshaper};
use crate::graph::node::{Lanes, RenderCtx, Stage};
use crate::params::{ParamId, SPARK_GAIN_RANGE};

/*
Arc Path
========

A parallel branch that adds the "snap" of a real electrical arc without
touching the main chain:

    main ──┬──────────────► tape ──────────┐
           │                               ▼
           └─► HPF 3 kHz, Q 5 ─► hard clip (4x) ─► arc gain ─► master

1. The resonant high-pass strips the hum and keeps the sizzle; Q = 5 adds a
   ringing "zap" at the cutoff.
2. The hard clip turns soft Gaussian spikes into flat-topped cracks.
3. Arc gain follows the spark control:
       arcGain = min((sparkGain / 200) · 0.5, 0.5)
   and is ramped like any other gain.

The branch taps the signal before the tape emulator and joins again at the
master bus, so the wow/flutter delay never smears its transients.
*/

pub const ARC_CUTOFF_HZ: f32 = 3000.0;
pub const ARC_Q: f32 = 5.0;
pub const ARC_MAX_GAIN: f32 = 0.5;

/// Arc branch level for a given spark gain.
#[inline]
pub fn arc_gain(spark_gain: f32) -> f32 {
    ((SPARK_GAIN_RANGE.clamp(spark_gain) / 200.0) * 0.5).min(ARC_MAX_GAIN)
}

pub struct ArcPath {
    filter: SVFilter,
    shaper: Waveshaper,
    gain: LinearRamp,
}

impl ArcPath {
    pub fn new(spark_gain: f32) -> Self {
        Self {
            filter: SVFilter::highpass(ARC_CUTOFF_HZ, ARC_Q),
            shaper: Waveshaper::oversampled(Curve::HardClip),
            gain: LinearRamp::new(arc_gain(spark_gain)),
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain.value()
    }
}

impl Stage for ArcPath {
    fn process(&mut self, lanes: &mut Lanes, ctx: &RenderCtx) {
        let n = lanes.len();
        let arc = &mut lanes.arc[..n];
        arc.copy_from_slice(&lanes.main[..n]);

        self.filter.render(arc, ctx.sample_rate);
        self.shaper.render(arc);
        for sample in arc.iter_mut() {
            *sample *= self.gain.next_value();
        }
    }

    fn set_param(&mut self, id: ParamId, value: f32, ramp_samples: usize) {
        if id == ParamId::SparkGain {
            self.gain.set_target(arc_gain(value), ramp_samples);
        }
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.shaper.reset();
    }

    fn name(&self) -> &'static str {
        "arc-path"
    }
}
