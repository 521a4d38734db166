//! Linear parameter ramps.

/*
Parameter Ramps
===============

Jumping a gain from 0.2 to 0.8 between two samples puts a step into the
waveform, which the ear hears as a click. Every continuous control in the
live graph therefore moves along a straight line from its old value to its
new value over a fixed window (50 ms by default).

    value
      b ┤            ╭──────────
        │          ╱
        │        ╱
        │      ╱
      a ┼────╯
        └────┬───────────┬──────→ samples
           update     update + N

The ramp is sampled once per audio sample. The first sample after an update
still reads the old value `a`; sample `k` reads `a + k * (b - a) / N`; sample
`N` reads exactly `b` (the last step snaps to the target so float error never
leaves the value a hair off).

A ramp of length 0 is an immediate set. Retargeting mid-ramp starts the new
ramp from wherever the value currently is.
*/

#[derive(Debug, Clone, Copy)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    step: f32,
    remaining: usize,
}

impl LinearRamp {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
            remaining: 0,
        }
    }

    /// Start moving towards `target` over `ramp_samples` samples.
    pub fn set_target(&mut self, target: f32, ramp_samples: usize) {
        if ramp_samples == 0 {
            self.set_immediate(target);
            return;
        }

        self.target = target;
        self.step = (target - self.current) / ramp_samples as f32;
        self.remaining = ramp_samples;
    }

    /// Jump straight to `value`, cancelling any ramp in flight.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    /// Current value, then advance one sample.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let value = self.current;

        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }

        value
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }

    /// Fill `out` with successive ramp values.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.is_ramping() {
            out.fill(self.current);
            return;
        }
        for sample in out.iter_mut() {
            *sample = self.next_value();
        }
    }
}
