//! Random sources for the contact model.
//!
//! Every draw goes through a caller-supplied [`rand::Rng`] so a seeded
//! `StdRng` reproduces the exact same spark sequence in tests. The engine and
//! renderer default to an entropy seed.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded generator, or an entropy-seeded one when `seed` is `None`.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Uniform in [0, 1).
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}

/// Uniform in [-1, 1): `(U - 0.5) * 2`.
#[inline]
pub fn centered_uniform<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0
}

/// Standard normal via the Box-Muller transform (cosine branch only).
#[inline]
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let mut u1 = rng.gen::<f32>();
    let u2 = rng.gen::<f32>();
    // ln(0) is the only non-finite case
    if u1 == 0.0 {
        u1 = f32::MIN_POSITIVE;
    }
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}
