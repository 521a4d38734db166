//! Control snapshots handed to the engine.
//!
//! A [`ParameterSet`] is an immutable, `Copy` bag of the controls exposed by
//! the control layer. The engine takes it by value and never writes back to
//! the caller's copy. Values are clamped into their documented ranges on the
//! way in rather than rejected, so an out-of-range slider can never push a
//! filter or delay line into an unstable state.

pub mod presets;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive range of a numeric control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp into range. NaN collapses to `min`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

pub const THRESHOLD_RANGE: Range = Range::new(0.1, 0.9);
pub const SMOOTHNESS_RANGE: Range = Range::new(50.0, 2000.0);
pub const SPARK_GAIN_RANGE: Range = Range::new(0.0, 200.0);
pub const UNIT_RANGE: Range = Range::new(0.0, 1.0);
pub const CARRIER_FREQ_RANGE: Range = Range::new(100.0, 3000.0);

/// Names of the individual controls.
///
/// Used by stages to receive targeted updates (`Stage::set_param`) and by the
/// graph to work out which controls changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Threshold,
    Smoothness,
    SparkGain,
    NoiseGain,
    HumGain,
    Hum120Gain,
    Hum180Gain,
    Hum300Gain,
    RingModEnabled,
    CarrierFreq,
    WowFlutterDepth,
    Saturation,
    MasterVolume,
}

impl ParamId {
    pub const ALL: [ParamId; 13] = [
        ParamId::Threshold,
        ParamId::Smoothness,
        ParamId::SparkGain,
        ParamId::NoiseGain,
        ParamId::HumGain,
        ParamId::Hum120Gain,
        ParamId::Hum180Gain,
        ParamId::Hum300Gain,
        ParamId::RingModEnabled,
        ParamId::CarrierFreq,
        ParamId::WowFlutterDepth,
        ParamId::Saturation,
        ParamId::MasterVolume,
    ];

    /// Live range of the control. Booleans report `[0, 1]`.
    pub fn range(self) -> Range {
        match self {
            ParamId::Threshold => THRESHOLD_RANGE,
            ParamId::Smoothness => SMOOTHNESS_RANGE,
            ParamId::SparkGain => SPARK_GAIN_RANGE,
            ParamId::CarrierFreq => CARRIER_FREQ_RANGE,
            _ => UNIT_RANGE,
        }
    }

    /// Whether a change should be ramped rather than applied at once.
    ///
    /// `SparkGain` is both: the transient scale switches at the block
    /// boundary while the arc gain it drives is ramped.
    pub fn is_continuous(self) -> bool {
        !matches!(
            self,
            ParamId::Threshold | ParamId::Smoothness | ParamId::Saturation
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamId::Threshold => "threshold",
            ParamId::Smoothness => "smoothness",
            ParamId::SparkGain => "sparkGain",
            ParamId::NoiseGain => "noiseGain",
            ParamId::HumGain => "humGain",
            ParamId::Hum120Gain => "hum120Gain",
            ParamId::Hum180Gain => "hum180Gain",
            ParamId::Hum300Gain => "hum300Gain",
            ParamId::RingModEnabled => "ringModEnabled",
            ParamId::CarrierFreq => "carrierFreq",
            ParamId::WowFlutterDepth => "wowFlutterDepth",
            ParamId::Saturation => "saturation",
            ParamId::MasterVolume => "masterVolume",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    /// Connection threshold, 0.1 - 0.9
    pub threshold: f32,
    /// Envelope smoothing, 50 - 2000 (live window is smoothness / 10 samples)
    pub smoothness: f32,
    /// Spark intensity, 0 - 200
    pub spark_gain: f32,
    /// Level of the spark/noise contribution, 0 - 1
    pub noise_gain: f32,
    /// 60 Hz fundamental, 0 - 1
    pub hum_gain: f32,
    pub hum120_gain: f32,
    pub hum180_gain: f32,
    pub hum300_gain: f32,
    pub ring_mod_enabled: bool,
    /// Ring modulator carrier, 100 - 3000 Hz
    pub carrier_freq: f32,
    /// Wow/flutter depth, 0 - 1 (0 - 2 ms of delay modulation)
    pub wow_flutter_depth: f32,
    /// Tape saturation amount, 0 - 1
    pub saturation: f32,
    pub master_volume: f32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        presets::CLASSIC_HUM
    }
}

impl ParameterSet {
    /// Copy with every control clamped into its live range.
    pub fn clamped(&self) -> Self {
        Self {
            threshold: THRESHOLD_RANGE.clamp(self.threshold),
            smoothness: SMOOTHNESS_RANGE.clamp(self.smoothness),
            spark_gain: SPARK_GAIN_RANGE.clamp(self.spark_gain),
            noise_gain: UNIT_RANGE.clamp(self.noise_gain),
            hum_gain: UNIT_RANGE.clamp(self.hum_gain),
            hum120_gain: UNIT_RANGE.clamp(self.hum120_gain),
            hum180_gain: UNIT_RANGE.clamp(self.hum180_gain),
            hum300_gain: UNIT_RANGE.clamp(self.hum300_gain),
            ring_mod_enabled: self.ring_mod_enabled,
            carrier_freq: CARRIER_FREQ_RANGE.clamp(self.carrier_freq),
            wow_flutter_depth: UNIT_RANGE.clamp(self.wow_flutter_depth),
            saturation: UNIT_RANGE.clamp(self.saturation),
            master_volume: UNIT_RANGE.clamp(self.master_volume),
        }
    }

    /// Value of a single control as `f32`; booleans map to 0.0 / 1.0.
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::Threshold => self.threshold,
            ParamId::Smoothness => self.smoothness,
            ParamId::SparkGain => self.spark_gain,
            ParamId::NoiseGain => self.noise_gain,
            ParamId::HumGain => self.hum_gain,
            ParamId::Hum120Gain => self.hum120_gain,
            ParamId::Hum180Gain => self.hum180_gain,
            ParamId::Hum300Gain => self.hum300_gain,
            ParamId::RingModEnabled => {
                if self.ring_mod_enabled {
                    1.0
                } else {
                    0.0
                }
            }
            ParamId::CarrierFreq => self.carrier_freq,
            ParamId::WowFlutterDepth => self.wow_flutter_depth,
            ParamId::Saturation => self.saturation,
            ParamId::MasterVolume => self.master_volume,
        }
    }

    /// Controls whose value differs between `self` and `other`.
    pub fn diff<'a>(&'a self, other: &'a ParameterSet) -> impl Iterator<Item = ParamId> + 'a {
        ParamId::ALL
            .into_iter()
            .filter(move |&id| self.get(id).to_bits() != other.get(id).to_bits())
    }

    /// Envelope window used by the live graph: `max(1, floor(smoothness / 10))`.
    pub fn streaming_window(&self) -> usize {
        streaming_window(self.smoothness)
    }
}

#[inline]
pub(crate) fn streaming_window(smoothness: f32) -> usize {
    ((smoothness / 10.0).floor() as usize).max(1)
}
