//! Waveshaping curves
//!
//! A waveshaper applies a fixed transfer function to every sample:
//!   output = f(input)
//!
//! Two curves are used by the interference model.
//!
//! # Tape saturation
//!
//!   f(x) = tanh(drive · x),  drive = amount · 50
//!
//! Soft, symmetric compression of the peaks. At `amount` below 0.01 the
//! curve is replaced by the identity f(x) = x. A tanh curve with drive 0
//! would be flat at zero and mute everything passing through it, so "no
//! saturation" has to mean "pass-through", not "tanh(0)".
//!
//! # Arc hard clip
//!
//!   f(x) =  1.0   for x >  0.5
//!   f(x) = -1.0   for x < -0.5
//!   f(x) =  2x    otherwise
//!
//! A steep linear middle section that slams into the rails. Gaussian spark
//! spikes come out as flat-topped "cracks".
//!
//! # Oversampling
//!
//! A hard corner in the transfer function creates harmonics far above the
//! input band, and anything above Nyquist folds back as aliasing. The arc
//! path therefore evaluates its curve at 4x the sample rate: each input
//! sample is expanded into four linearly interpolated sub-samples, each
//! sub-sample is shaped, and the four results are averaged back down.

/// Below this amount the saturation curve is the identity.
pub const SATURATION_IDENTITY_BELOW: f32 = 0.01;

/// Saturation amount to tanh drive.
pub const SATURATION_DRIVE_SCALE: f32 = 50.0;

pub const OVERSAMPLE_FACTOR: usize = 4;

/// Transfer functions available to [`Waveshaper`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Curve {
    /// f(x) = x
    Identity,
    /// f(x) = tanh(drive · x)
    Tanh { drive: f32 },
    /// Rails at ±1 beyond ±0.5, slope 2 in between
    HardClip,
}

impl Curve {
    /// Tape saturation curve for `amount` in [0, 1].
    pub fn saturation(amount: f32) -> Self {
        if amount.is_nan() || amount < SATURATION_IDENTITY_BELOW {
            Curve::Identity
        } else {
            Curve::Tanh {
                drive: amount.min(1.0) * SATURATION_DRIVE_SCALE,
            }
        }
    }

    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        match *self {
            Curve::Identity => x,
            Curve::Tanh { drive } => (drive * x).tanh(),
            Curve::HardClip => hard_clip(x),
        }
    }

    /// Sample the curve over [-1, 1] into a lookup table of `len` points,
    /// endpoints included. Handy for plotting the transfer function.
    pub fn table(&self, len: usize) -> Vec<f32> {
        let len = len.max(2);
        (0..len)
            .map(|i| {
                let x = -1.0 + 2.0 * i as f32 / (len - 1) as f32;
                self.apply(x)
            })
            .collect()
    }
}

/// Arc hard clip.
#[inline]
pub fn hard_clip(x: f32) -> f32 {
    if x > 0.5 {
        1.0
    } else if x < -0.5 {
        -1.0
    } else {
        2.0 * x
    }
}

/// Applies a [`Curve`], optionally at 4x oversampling.
pub struct Waveshaper {
    curve: Curve,
    oversample: bool,
    previous: f32,
}

impl Waveshaper {
    pub fn new(curve: Curve) -> Self {
        Self {
            curve,
            oversample: false,
            previous: 0.0,
        }
    }

    pub fn oversampled(curve: Curve) -> Self {
        Self {
            curve,
            oversample: true,
            previous: 0.0,
        }
    }

    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Swap the transfer function. Takes effect from the next sample.
    pub fn set_curve(&mut self, curve: Curve) {
        self.curve = curve;
    }

    #[inline]
    pub fn next_sample(&mut self, x: f32) -> f32 {
        if !self.oversample {
            return self.curve.apply(x);
        }

        let mut acc = 0.0;
        for step in 1..=OVERSAMPLE_FACTOR {
            let t = step as f32 / OVERSAMPLE_FACTOR as f32;
            let sub = self.previous + (x - self.previous) * t;
            acc += self.curve.apply(sub);
        }
        self.previous = x;
        acc / OVERSAMPLE_FACTOR as f32
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.previous = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_saturation_is_identity() {
        let curve = Curve::saturation(0.0);
        assert_eq!(curve, Curve::Identity);
        assert!((curve.apply(-1.0) + 1.0).abs() < 1e-6);
        assert!(curve.apply(0.0).abs() < 1e-6);
        assert!((curve.apply(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_zero_saturation_does_not_mute() {
        let curve = Curve::saturation(0.009);
        assert!(curve.table(1024).iter().any(|v| v.abs() > 0.5));
    }

    #[test]
    fn test_saturation_drive_scaling() {
        assert_eq!(Curve::saturation(0.5), Curve::Tanh { drive: 25.0 });
        let full = Curve::saturation(1.0);
        // tanh(50 * 0.1) is already close to the rail
        assert!(full.apply(0.1) > 0.99);
        assert!(full.apply(-0.1) < -0.99);
    }

    #[test]
    fn test_hard_clip_points() {
        assert_eq!(hard_clip(0.5), 1.0);
        assert_eq!(hard_clip(-0.5), -1.0);
        assert_eq!(hard_clip(0.0), 0.0);
        assert_eq!(hard_clip(0.25), 0.5);
        assert_eq!(hard_clip(0.9), 1.0);
        assert_eq!(hard_clip(-3.0), -1.0);
    }

    #[test]
    fn test_table_endpoints_exact() {
        let table = Curve::Identity.table(1024);
        assert_eq!(table.len(), 1024);
        assert_eq!(table[0], -1.0);
        assert_eq!(table[1023], 1.0);
    }

    #[test]
    fn test_oversampled_constant_settles_to_curve_value() {
        let mut shaper = Waveshaper::oversampled(Curve::HardClip);
        let mut buffer = vec![0.25; 8];
        shaper.render(&mut buffer);
        assert!((buffer[7] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_oversampled_output_bounded() {
        let mut shaper = Waveshaper::oversampled(Curve::HardClip);
        let mut buffer: Vec<f32> = (0..256).map(|i| ((i as f32) * 0.37).sin() * 4.0).collect();
        shaper.render(&mut buffer);
        assert!(buffer.iter().all(|s| s.abs() <= 1.0 + 1e-6));
    }

    #[test]
    fn test_set_curve_switches_transfer_function() {
        let mut shaper = Waveshaper::new(Curve::Identity);
        assert_eq!(shaper.next_sample(0.3), 0.3);
        shaper.set_curve(Curve::saturation(1.0));
        assert!(shaper.next_sample(0.3) > 0.99);
    }
}
