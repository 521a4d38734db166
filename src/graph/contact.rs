use rand::rngs::StdRng;

use crate::dsp::envelope::{EnvelopeFollower, StreamingEnvelope};
use crate::dsp::noise::{gaussian, rng_from_seed, uniform};
use crate::dsp::transient::{connection_mask, spark, FrictionTracker};
use crate::graph::node::{Lanes, RenderCtx, Stage};
use crate::params::{ParamId, ParameterSet, SMOOTHNESS_RANGE, SPARK_GAIN_RANGE, THRESHOLD_RANGE};

/*
Contact Stage
=============

The stochastic "hand on the cable". Per sample:

  1. draw raw uniform noise in [0, 1)
  2. streaming envelope: mean of the last smoothness/10 raw samples
  3. mask  = envelope > threshold
  4. friction = |envelope - previous envelope|
  5. spark = gaussian · friction · sparkGain

Writes the `envelope`, `mask` and `spark` lanes. Downstream the mixer gates
the hum with the mask and adds the spark on top, ungated.

All three controls here are discrete: threshold and spark gain switch at the
block boundary, and a new smoothness clears the envelope FIFO outright.
*/

pub struct ContactStage {
    envelope: StreamingEnvelope,
    friction: FrictionTracker,
    rng: StdRng,
    threshold: f32,
    spark_gain: f32,
    smoothness: f32,
}

impl ContactStage {
    pub fn new(params: &ParameterSet, seed: Option<u64>) -> Self {
        Self::with_rng(params, rng_from_seed(seed))
    }

    pub fn with_rng(params: &ParameterSet, rng: StdRng) -> Self {
        Self {
            envelope: StreamingEnvelope::new(params.smoothness),
            friction: FrictionTracker::new(),
            rng,
            threshold: params.threshold,
            spark_gain: params.spark_gain,
            smoothness: params.smoothness,
        }
    }

    pub fn window(&self) -> usize {
        self.envelope.window()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl Stage for ContactStage {
    fn process(&mut self, lanes: &mut Lanes, _ctx: &RenderCtx) {
        let n = lanes.len();
        let Lanes {
            envelope,
            mask,
            spark: spark_lane,
            ..
        } = lanes;

        for i in 0..n {
            let raw = uniform(&mut self.rng);
            let env = self.envelope.next_sample(raw);
            let friction = self.friction.next_sample(env);
            let noise = gaussian(&mut self.rng);

            envelope[i] = env;
            mask[i] = connection_mask(env, self.threshold);
            spark_lane[i] = spark(noise, friction, self.spark_gain);
        }
    }

    fn set_param(&mut self, id: ParamId, value: f32, _ramp_samples: usize) {
        match id {
            ParamId::Threshold => self.threshold = THRESHOLD_RANGE.clamp(value),
            ParamId::SparkGain => self.spark_gain = SPARK_GAIN_RANGE.clamp(value),
            ParamId::Smoothness => {
                let smoothness = SMOOTHNESS_RANGE.clamp(value);
                if smoothness != self.smoothness {
                    self.smoothness = smoothness;
                    self.envelope.set_smoothness(smoothness);
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.envelope.reset();
        self.friction.reset();
    }

    fn name(&self) -> &'static str {
        "contact"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(stage: &mut ContactStage, len: usize) -> Lanes {
        let mut lanes = Lanes::new();
        lanes.begin_block(len);
        stage.process(&mut lanes, &RenderCtx::new(48_000.0));
        lanes
    }

    #[test]
    fn test_lanes_respect_invariants() {
        let mut stage = ContactStage::new(&ParameterSet::default(), Some(42));
        let lanes = render(&mut stage, 2048);

        for i in 0..lanes.len() {
            assert!((0.0..=1.0).contains(&lanes.envelope[i]));
            assert!(lanes.mask[i] == 0.0 || lanes.mask[i] == 1.0);
            assert!(lanes.spark[i].is_finite());
        }
        // friction(0) = 0, so the first spark is silent
        assert_eq!(lanes.spark[0], 0.0);
    }

    #[test]
    fn test_same_seed_same_sparks() {
        let params = ParameterSet::default();
        let a = render(&mut ContactStage::new(&params, Some(9)), 512);
        let b = render(&mut ContactStage::new(&params, Some(9)), 512);
        assert_eq!(a.spark[..512], b.spark[..512]);
        assert_eq!(a.envelope[..512], b.envelope[..512]);
    }

    #[test]
    fn test_zero_spark_gain_silences_sparks() {
        let params = ParameterSet {
            spark_gain: 0.0,
            ..ParameterSet::default()
        };
        let lanes = render(&mut ContactStage::new(&params, Some(1)), 1024);
        assert!(lanes.spark[..1024].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_smoothness_update_resizes_window() {
        let mut stage = ContactStage::new(&ParameterSet::default(), Some(3));
        assert_eq!(stage.window(), 50);

        stage.set_param(ParamId::Smoothness, 1200.0, 2400);
        assert_eq!(stage.window(), 120);

        // out of range is clamped, never propagated
        stage.set_param(ParamId::Smoothness, 10.0, 0);
        assert_eq!(stage.window(), 5);
    }

    #[test]
    fn test_reset_restarts_friction() {
        let mut stage = ContactStage::new(&ParameterSet::default(), Some(17));
        let before = render(&mut stage, 512);
        assert!(before.spark[1..512].iter().any(|&s| s != 0.0));

        stage.reset();
        let after = render(&mut stage, 512);
        assert_eq!(after.spark[0], 0.0);
        assert!((0.0..=1.0).contains(&after.envelope[0]));
    }

    #[test]
    fn test_threshold_clamped() {
        let mut stage = ContactStage::new(&ParameterSet::default(), Some(3));
        stage.set_param(ParamId::Threshold, 4.0, 0);
        assert_eq!(stage.threshold(), 0.9);
    }
}
