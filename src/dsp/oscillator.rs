use std::f64::consts::TAU;

/*
Sine Oscillator
===============

Every periodic source in the interference model is a plain sine: the four
mains-hum partials, the ring modulator carrier and the tape LFO.

The oscillator keeps a phase accumulator in cycles (0.0 .. 1.0) rather than
computing sin(2π f t) from an absolute time. The two agree while the
frequency is constant, but only the accumulator stays continuous when the
frequency moves (a ramped carrier would otherwise jump in phase and click).

    phase[n+1] = fract(phase[n] + f / sample_rate)
    out[n]     = sin(2π · phase[n])

The accumulator is f64 so a 60 Hz hum left running for hours does not
drift audibly.
*/

#[derive(Debug, Clone, Copy, Default)]
pub struct SineOsc {
    phase: f64,
}

impl SineOsc {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Current sample, then advance by one sample at `frequency_hz`.
    #[inline]
    pub fn next_sample(&mut self, frequency_hz: f32, sample_rate: f32) -> f32 {
        let out = (TAU * self.phase).sin() as f32;
        self.phase += frequency_hz as f64 / sample_rate as f64;
        self.phase -= self.phase.floor();
        out
    }

    /// Fill `out` at a fixed frequency.
    pub fn render(&mut self, out: &mut [f32], frequency_hz: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency_hz, sample_rate);
        }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let freq = 60.0;
        let mut osc = SineOsc::new();

        let mut buffer = vec![0.0f32; 512];
        osc.render(&mut buffer, freq, sample_rate);

        // sample n should be sin(2pi f n / sr)
        for sample_index in [0, 12, 200, 511] {
            let expected = (TAU * freq * sample_index as f32 / sample_rate).sin();
            let actual = buffer[sample_index];
            assert!(
                (actual - expected).abs() < 1e-4,
                "sample {sample_index}: expected {expected}, got {actual}"
            );
        }
    }

    #[test]
    fn test_phase_wraps() {
        let mut osc = SineOsc::new();
        for _ in 0..100_000 {
            osc.next_sample(3000.0, 44_100.0);
        }
        assert!((0.0..1.0).contains(&osc.phase()));
    }

    #[test]
    fn test_reset_restarts_at_zero() {
        let mut osc = SineOsc::new();
        osc.next_sample(440.0, 48_000.0);
        osc.next_sample(440.0, 48_000.0);
        osc.reset();
        assert_eq!(osc.next_sample(440.0, 48_000.0), 0.0);
    }
}
