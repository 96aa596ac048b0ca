//! Random variation helpers
//!
//! Small pure helpers for jittered numbers and color mixing. Every function
//! takes the caller's RNG so the session's seeded generator stays the single
//! source of randomness.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform value in `[min, max)`. Returns `min` when the range is empty.
pub fn in_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..max)
}

/// `base` plus a uniform offset in `[-spread, spread]`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, base: f32, spread: f32) -> f32 {
    if spread <= 0.0 {
        return base;
    }
    base + rng.random_range(-spread..=spread)
}

/// `base` scaled by a uniform factor in `[1 - fraction, 1 + fraction]`
pub fn jitter_pct<R: Rng + ?Sized>(rng: &mut R, base: f32, fraction: f32) -> f32 {
    jitter(rng, 1.0, fraction.abs()) * base
}

/// Inclusive integer range, tolerant of reversed bounds
pub fn int_in_range<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}

/// Random heading in radians, `[0, 2π)`
pub fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(0.0..std::f32::consts::TAU)
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend toward `other`; `t` is clamped to [0, 1]
    pub fn blend(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Brighten (positive) or darken (negative) each channel by a random amount up to `amount`
    pub fn vary<R: Rng + ?Sized>(self, rng: &mut R, amount: u8) -> Rgb {
        let amount = amount as i16;
        let mut shift = |c: u8| -> u8 {
            let delta = rng.random_range(-amount..=amount);
            (c as i16 + delta).clamp(0, 255) as u8
        };
        Rgb::new(shift(self.r), shift(self.g), shift(self.b))
    }
}
