/// Circular delay line with a fractional (linearly interpolated) read head.
///
/// The buffer is sized once at construction; reading and writing never
/// allocate.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(2) + 1],
            write_pos: 0,
        }
    }

    /// Longest delay (in samples) the line can produce.
    pub fn capacity(&self) -> usize {
        self.buffer.len() - 1
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read `delay_samples` behind the most recently written sample.
    ///
    /// `0.0` returns the last write; fractional delays blend the two
    /// neighbouring samples.
    #[inline]
    pub fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (self.capacity() - 1) as f32);

        let whole = delay.floor() as usize;
        let frac = delay - whole as f32;

        // write_pos points one past the newest sample
        let newest = (self.write_pos + len - 1) % len;
        let a = self.buffer[(newest + len - whole) % len];
        let b = self.buffer[(newest + len - whole - 1) % len];

        a + (b - a) * frac
    }

    /// Write `sample` and return the signal from `delay_samples` ago.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, delay_samples: f32) -> f32 {
        self.write(sample);
        self.read_interpolated(delay_samples)
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
