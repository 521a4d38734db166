use std::f32::consts::TAU;

/*
| output    | passes       | rejects      |
| --------- | ------------ | ------------ |
| low-pass  | below cutoff | above cutoff |
| high-pass | above cutoff | below cutoff |
| band-pass | near cutoff  | both sides   |

The TPT state-variable core produces all three responses per sample.
`render` keeps the high-pass one, which is what the arc path needs
(3 kHz, Q = 5).
*/

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

/// Topology-preserving-transform state-variable filter.
///
/// Damping is `k = 1 / Q`, so Q = 0.707 is maximally flat and larger Q
/// rings at the cutoff.
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    q: f32,
}

impl SVFilter {
    pub fn highpass(cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: q.max(0.01),
        }
    }

    /// Prewarped integrator gain. The cutoff is kept below Nyquist so the
    /// tangent never blows up at low sample rates.
    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        let cutoff = self.cutoff_hz.clamp(1.0, sample_rate * 0.49);
        (TAU * cutoff / (2.0 * sample_rate)).tan()
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = self.compute_g(sample_rate);
        let k = 1.0 / self.q;

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, k, g).highpass;
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::SineOsc;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn filtered_sine_peak(filter: &mut SVFilter, freq: f32) -> f32 {
        let sample_rate = 48_000.0;
        let mut buffer = vec![0.0f32; 2048];
        SineOsc::new().render(&mut buffer, freq, sample_rate);
        filter.reset();
        filter.render(&mut buffer, sample_rate);
        peak_after_transient(&buffer)
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = SVFilter::highpass(3000.0, 5.0);
        let mut buffer = vec![1.0; 4096];
        filter.render(&mut buffer, 48_000.0);
        assert!(buffer[4095].abs() < 0.001);
    }

    #[test]
    fn test_lowpass_output_tracks_dc() {
        let mut filter = SVFilter::highpass(500.0, 0.707);
        let sr = 48_000.0;
        let g = (TAU * 500.0 / (2.0 * sr)).tan();
        let mut last = 0.0;
        for _ in 0..512 {
            last = filter.next_sample(1.0, 1.0 / 0.707, g).lowpass;
        }
        assert!(last > 0.99);
    }

    #[test]
    fn test_highpass_rejects_hum() {
        let mut filter = SVFilter::highpass(3000.0, 5.0);
        let hum = filtered_sine_peak(&mut filter, 60.0);
        assert!(hum < 0.01, "60 Hz should be gone, got peak {hum}");
    }

    #[test]
    fn test_resonance_peaks_at_cutoff() {
        let mut filter = SVFilter::highpass(3000.0, 5.0);
        let at_cutoff = filtered_sine_peak(&mut filter, 3000.0);
        let above = filtered_sine_peak(&mut filter, 12_000.0);

        // Q = 5 boosts the cutoff roughly five-fold over the passband
        assert!(
            at_cutoff > above * 2.0,
            "expected resonant peak, got at_cutoff={at_cutoff}, above={above}"
        );
    }

    #[test]
    fn test_cutoff_clamped_below_nyquist() {
        let mut filter = SVFilter::highpass(30_000.0, 5.0);
        let mut buffer = vec![0.5; 256];
        filter.render(&mut buffer, 22_050.0);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
