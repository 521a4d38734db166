//! Offline rendering.

/*
Offline Renderer
================

Single-threaded, whole-buffer rendering from one parameter set:

    1. time[i]     = i / sampleRate
    2. hum[i]      = humGain · (sin 60 + 0.4 sin 120 + 0.3 sin 180 + 0.2 sin 300)
    3. raw[i]      ~ U[0, 1)                       (all drawn up front)
    4. envelope    = batch envelope of raw         (centred window of
                                                    `smoothness` samples,
                                                    then min/max rescale)
    5. friction[i] = |envelope[i] - envelope[i-1]|, friction[0] = 0
    6. mask[i]     = envelope[i] > threshold
    7. spark[i]    = ((U - 0.5) · 2) · friction[i] · sparkGain
    8. out[i]      = clamp(hum[i] · mask[i] + spark[i], -1, 1)

This is the acausal counterpart of the live graph. The envelope window here
is `smoothness` samples wide and centred (it looks ahead); the live graph
averages only the last `smoothness / 10`. The spark noise is a centred
uniform here and Gaussian in the live graph. Both differences are
deliberate: the two paths are separate variants and are kept that way.

There is no ring modulation, tape or arc stage offline. For a preview of
the full live chain use [`bounce`].
*/

pub mod bounce;
pub mod wav;

use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::{BatchEnvelope, EnvelopeFollower};
use crate::dsp::noise::{centered_uniform, rng_from_seed, uniform};
use crate::dsp::transient::{connection_mask, friction_block, spark};
use crate::error::{EngineError, Result};
use crate::graph::hum::HarmonicBank;
use crate::graph::mix::mix_sample;
use crate::params::{ParameterSet, SPARK_GAIN_RANGE, THRESHOLD_RANGE, UNIT_RANGE};

pub use bounce::bounce;

/// Longest render accepted, in seconds.
pub const MAX_RENDER_SECONDS: f32 = 3600.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub duration_seconds: f32,
    pub sample_rate: u32,
    pub threshold: f32,
    /// Batch window in samples; any positive value (floored, at least 1)
    pub smoothness: f32,
    pub spark_gain: f32,
    pub hum_gain: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_params(&ParameterSet::default(), 1.0, 48_000)
    }
}

impl RenderConfig {
    /// Offline controls taken from a live snapshot.
    pub fn from_params(params: &ParameterSet, duration_seconds: f32, sample_rate: u32) -> Self {
        Self {
            duration_seconds,
            sample_rate,
            threshold: params.threshold,
            smoothness: params.smoothness,
            spark_gain: params.spark_gain,
            hum_gain: params.hum_gain,
        }
    }

    /// Number of samples the render will produce: `floor(sampleRate · duration)`.
    pub fn num_samples(&self) -> usize {
        (self.sample_rate as f64 * self.duration_seconds as f64).floor() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(EngineError::InvalidRenderConfig(
                "sample rate must be non-zero".into(),
            ));
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds <= 0.0 {
            return Err(EngineError::InvalidRenderConfig(format!(
                "duration must be positive, got {}",
                self.duration_seconds
            )));
        }
        if self.duration_seconds > MAX_RENDER_SECONDS {
            return Err(EngineError::InvalidRenderConfig(format!(
                "duration {} s exceeds the {} s limit",
                self.duration_seconds, MAX_RENDER_SECONDS
            )));
        }
        Ok(())
    }
}

/// Buffers produced by [`OfflineRenderer::render`], all of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    /// Output samples, [-1, 1]
    pub samples: Vec<f32>,
    /// Normalised batch envelope, [0, 1]
    pub envelope: Vec<f32>,
    /// Time of each sample in seconds
    pub time: Vec<f32>,
    pub sample_rate: u32,
}

impl RenderOutput {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Fraction of samples where the contact was closed.
    pub fn connected_ratio(&self, threshold: f32) -> f32 {
        if self.envelope.is_empty() {
            return 0.0;
        }
        let closed = self.envelope.iter().filter(|&&e| e > threshold).count();
        closed as f32 / self.envelope.len() as f32
    }

    pub fn to_wav(&self) -> Result<Vec<u8>> {
        wav::encode_wav(&self.samples, self.sample_rate)
    }
}

pub struct OfflineRenderer {
    config: RenderConfig,
    seed: Option<u64>,
}

impl OfflineRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config, seed: None }
    }

    /// Fix the random source so the render is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render(&self) -> Result<RenderOutput> {
        self.config.validate()?;

        let cfg = &self.config;
        let n = cfg.num_samples();
        let sample_rate = cfg.sample_rate as f32;
        let threshold = THRESHOLD_RANGE.clamp(cfg.threshold);
        let spark_gain = SPARK_GAIN_RANGE.clamp(cfg.spark_gain);
        let hum_gain = UNIT_RANGE.clamp(cfg.hum_gain);
        let smoothness = if cfg.smoothness.is_nan() { 1.0 } else { cfg.smoothness };

        let time: Vec<f32> = (0..n).map(|i| i as f32 / sample_rate).collect();

        let mut hum = vec![0.0; n];
        HarmonicBank::offline(hum_gain).render(&mut hum, sample_rate);

        let mut rng = rng_from_seed(self.seed);
        let raw: Vec<f32> = (0..n).map(|_| uniform(&mut rng)).collect();

        let mut follower = BatchEnvelope::new(smoothness);
        let mut envelope = vec![0.0; n];
        follower.follow(&raw, &mut envelope);

        let mut friction = vec![0.0; n];
        friction_block(&envelope, &mut friction);

        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let mask = connection_mask(envelope[i], threshold);
                let s = spark(centered_uniform(&mut rng), friction[i], spark_gain);
                mix_sample(hum[i], mask, s, 1.0)
            })
            .collect();

        info!(
            samples = n,
            sample_rate = cfg.sample_rate,
            window = follower.window(),
            "offline render complete"
        );

        Ok(RenderOutput {
            samples,
            envelope,
            time,
            sample_rate: cfg.sample_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(duration_seconds: f32) -> RenderConfig {
        RenderConfig {
            duration_seconds,
            sample_rate: 8_000,
            threshold: 0.6,
            smoothness: 100.0,
            spark_gain: 30.0,
            hum_gain: 0.5,
        }
    }

    #[test]
    fn test_buffers_share_length() {
        let out = OfflineRenderer::new(config(0.5)).with_seed(1).render().unwrap();
        assert_eq!(out.len(), 4_000);
        assert_eq!(out.envelope.len(), 4_000);
        assert_eq!(out.time.len(), 4_000);
        assert_eq!(out.time[0], 0.0);
        assert!((out.time[8] - 0.001).abs() < 1e-7);
    }

    #[test]
    fn test_seeded_render_repeats() {
        let a = OfflineRenderer::new(config(0.25)).with_seed(3).render().unwrap();
        let b = OfflineRenderer::new(config(0.25)).with_seed(3).render().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_envelope_spans_unit_range() {
        let out = OfflineRenderer::new(config(0.5)).with_seed(4).render().unwrap();
        let min = out.envelope.iter().cloned().fold(f32::MAX, f32::min);
        let max = out.envelope.iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
    }

    #[test]
    fn test_zero_gains_silent() {
        let cfg = RenderConfig {
            spark_gain: 0.0,
            hum_gain: 0.0,
            ..config(0.1)
        };
        let out = OfflineRenderer::new(cfg).with_seed(5).render().unwrap();
        assert!(out.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        for cfg in [
            config(0.0),
            config(-1.0),
            config(f32::NAN),
            config(f32::INFINITY),
            RenderConfig {
                sample_rate: 0,
                ..config(1.0)
            },
        ] {
            let err = OfflineRenderer::new(cfg).render().unwrap_err();
            assert!(matches!(err, EngineError::InvalidRenderConfig(_)));
        }
    }

    #[test]
    fn test_from_params() {
        let cfg = RenderConfig::from_params(&ParameterSet::default(), 2.0, 44_100);
        assert_eq!(cfg.num_samples(), 88_200);
        assert_eq!(cfg.threshold, 0.6);
        assert_eq!(cfg.smoothness, 500.0);
    }
}
