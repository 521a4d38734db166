//! Connection gate and spark (friction) generation.

/*
Gate and Sparks
===============

Connection mask
    mask(t) = 1 if envelope(t) > threshold else 0

    Strictly binary and without hysteresis: an envelope hovering right at
    the threshold chatters on and off, which is part of the sound.

Friction
    friction(t) = |envelope(t) - envelope(t - 1)|,   friction(0) = 0

    How fast the contact is moving. A still contact makes no sparks even
    when it is closed; a contact in motion sparks even when it is open.

Spark
    spark(t) = noise(t) · friction(t) · sparkGain

    The live graph draws noise(t) from a standard normal (Box-Muller); the
    offline renderer draws it from a centred uniform in [-1, 1). The spark
    is NOT gated by the mask: that ungated crackle between connections is
    the "breaking contact" sound.
*/

/// Binary gate: 1.0 above the threshold, otherwise 0.0. Never fractional.
#[inline]
pub fn connection_mask(envelope: f32, threshold: f32) -> f32 {
    if envelope > threshold {
        1.0
    } else {
        0.0
    }
}

/// Gate a whole block.
pub fn mask_block(envelope: &[f32], threshold: f32, mask: &mut [f32]) {
    for (m, &e) in mask.iter_mut().zip(envelope) {
        *m = connection_mask(e, threshold);
    }
}

/// Friction of a complete envelope buffer: `out[0] = 0`, `out[i] = |env[i] - env[i-1]|`.
pub fn friction_block(envelope: &[f32], out: &mut [f32]) {
    let mut tracker = FrictionTracker::new();
    for (f, &e) in out.iter_mut().zip(envelope) {
        *f = tracker.next_sample(e);
    }
}

/// Streaming friction: remembers the previous envelope value across blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrictionTracker {
    previous: Option<f32>,
}

impl FrictionTracker {
    pub fn new() -> Self {
        Self { previous: None }
    }

    #[inline]
    pub fn next_sample(&mut self, envelope: f32) -> f32 {
        let friction = match self.previous {
            Some(prev) => (envelope - prev).abs(),
            None => 0.0,
        };
        self.previous = Some(envelope);
        friction
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

#[inline]
pub fn spark(noise: f32, friction: f32, spark_gain: f32) -> f32 {
    noise * friction * spark_gain
}
