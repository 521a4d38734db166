//! Envelope followers: turn raw uniform noise into a smooth [0, 1] contact level.

/*
Contact Envelope
================

The "hand on the cable" is modelled as heavily smoothed uniform noise. When
the smoothed level rises above the threshold the contact closes and the hum
gets through; when it falls back the contact opens.

Two followers exist and they are NOT interchangeable:

STREAMING (live graph)
    Causal moving average over the last N raw samples,
        N = max(1, floor(smoothness / 10))
    Push the new sample, drop the oldest once more than N are held, output
    the mean of what is held. It only ever sees the past. While the FIFO is
    still filling (right after start or a smoothness change) the mean is
    over fewer than N samples. No normalisation: the mean of values in
    [0, 1) already lies in [0, 1).

BATCH (offline renderer)
    Acausal centred moving average over the whole noise vector,
        W = max(1, floor(smoothness))
        avg[i] = mean(raw[i - floor(W/2) .. i + ceil(W/2)])   (clipped to bounds)
    followed by a global min/max rescale
        env[i] = (avg[i] - min) / (max - min)
    The rescale is skipped when max == min (constant input), which leaves
    the averages untouched instead of dividing by zero.

The batch follower needs the entire buffer up front, so it can only run
offline. The window scaling (/10) and the lack of normalisation in the
streaming variant are kept as they are; see DESIGN.md.
*/

/// Largest streaming window: the live smoothness ceiling (2000) divided by 10.
pub const MAX_STREAMING_WINDOW: usize = 200;

/// Shared interface of both followers.
///
/// `follow` maps raw noise to envelope values sample by sample. The
/// streaming follower carries state across calls; the batch follower treats
/// each call as one complete, self-contained buffer.
pub trait EnvelopeFollower {
    fn follow(&mut self, raw: &[f32], envelope: &mut [f32]);

    fn reset(&mut self);
}

/// Causal FIFO moving average used by the live graph.
pub struct StreamingEnvelope {
    fifo: [f32; MAX_STREAMING_WINDOW],
    start: usize,
    len: usize,
    window: usize,
    sum: f64,
}

impl StreamingEnvelope {
    pub fn new(smoothness: f32) -> Self {
        Self {
            fifo: [0.0; MAX_STREAMING_WINDOW],
            start: 0,
            len: 0,
            window: Self::window_for(smoothness),
            sum: 0.0,
        }
    }

    fn window_for(smoothness: f32) -> usize {
        crate::params::streaming_window(smoothness).min(MAX_STREAMING_WINDOW)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of raw samples currently held.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Change the window. Always clears the FIFO; the window is never resized in place.
    pub fn set_smoothness(&mut self, smoothness: f32) {
        self.window = Self::window_for(smoothness);
        self.reset();
    }

    #[inline]
    pub fn next_sample(&mut self, raw: f32) -> f32 {
        if self.len == self.window {
            self.sum -= self.fifo[self.start] as f64;
            self.start = (self.start + 1) % MAX_STREAMING_WINDOW;
            self.len -= 1;
        }

        let tail = (self.start + self.len) % MAX_STREAMING_WINDOW;
        self.fifo[tail] = raw;
        self.len += 1;
        self.sum += raw as f64;

        ((self.sum / self.len as f64) as f32).clamp(0.0, 1.0)
    }
}

impl EnvelopeFollower for StreamingEnvelope {
    fn follow(&mut self, raw: &[f32], envelope: &mut [f32]) {
        for (out, &x) in envelope.iter_mut().zip(raw) {
            *out = self.next_sample(x);
        }
    }

    fn reset(&mut self) {
        self.start = 0;
        self.len = 0;
        self.sum = 0.0;
    }
}

/// Centred moving average plus min/max normalisation over a whole buffer.
pub struct BatchEnvelope {
    window: usize,
}

impl BatchEnvelope {
    pub fn new(smoothness: f32) -> Self {
        Self {
            window: (smoothness.floor() as usize).max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl EnvelopeFollower for BatchEnvelope {
    fn follow(&mut self, raw: &[f32], envelope: &mut [f32]) {
        debug_assert_eq!(raw.len(), envelope.len(), "batch envelope needs the full buffer");
        centered_average(raw, self.window, envelope);
        normalize(envelope);
    }

    fn reset(&mut self) {}
}

/// Allocating convenience wrapper around [`BatchEnvelope`].
pub fn batch_envelope(raw: &[f32], smoothness: f32) -> Vec<f32> {
    let mut envelope = vec![0.0; raw.len()];
    BatchEnvelope::new(smoothness).follow(raw, &mut envelope);
    envelope
}

/// `out[i] = mean(raw[i - floor(w/2) .. i + ceil(w/2)])`, clipped to the buffer.
pub fn centered_average(raw: &[f32], window: usize, out: &mut [f32]) {
    let len = raw.len().min(out.len());
    if len == 0 {
        return;
    }

    let back = window / 2;
    let ahead = window.div_ceil(2);

    // prefix[k] = sum of raw[..k]
    let mut prefix = Vec::with_capacity(len + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &x in &raw[..len] {
        acc += x as f64;
        prefix.push(acc);
    }

    for (i, sample) in out[..len].iter_mut().enumerate() {
        let lo = i.saturating_sub(back);
        let hi = (i + ahead).min(len);
        let count = (hi - lo).max(1);
        *sample = ((prefix[hi] - prefix[lo]) / count as f64) as f32;
    }
}

/// Rescale to [0, 1] by global min/max. No-op when every value is equal.
pub fn normalize(values: &mut [f32]) {
    let Some(&first) = values.first() else {
        return;
    };

    let (min, max) = values
        .iter()
        .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x)));

    if max > min {
        let span = max - min;
        for v in values.iter_mut() {
            *v = ((*v - min) / span).clamp(0.0, 1.0);
        }
    }
}
