//! Channel mixer and master volume.
//!
//! The 2A03's non-linear DAC is approximated with fixed linear weights per
//! channel. Channel inputs are levels in `0.0..=1.0` (a 4-bit DAC value
//! divided by 15).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Weight of each pulse channel's 4-bit level
pub const PULSE_WEIGHT: f64 = 0.00752;
/// Weight of the triangle channel's 4-bit level
pub const TRIANGLE_WEIGHT: f64 = 0.00851;
/// Weight of the noise channel's 4-bit level
pub const NOISE_WEIGHT: f64 = 0.00494;

/// Mix the four tone channels and scale by `2 * volume`.
pub fn mix(pulse1: f64, pulse2: f64, triangle: f64, noise: f64, volume: f64) -> f64 {
    let mixed = PULSE_WEIGHT * (pulse1 * 15.0 + pulse2 * 15.0)
        + TRIANGLE_WEIGHT * triangle * 15.0
        + NOISE_WEIGHT * noise * 15.0;
    mixed * 2.0 * volume
}

/// Master volume shared between the APU and a UI thread.
///
/// Stores the `f64` bit pattern in an atomic so it can be changed without
/// touching the lock that guards the rest of the APU. Clones share the
/// same value.
#[derive(Debug, Clone)]
pub struct MasterVolume(Arc<AtomicU64>);

impl MasterVolume {
    pub fn new(volume: f64) -> Self {
        Self(Arc::new(AtomicU64::new(clamp_volume(volume).to_bits())))
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Set the volume, clamped to `0.0..=1.0`. NaN is treated as silence.
    pub fn set(&self, volume: f64) {
        self.0
            .store(clamp_volume(volume).to_bits(), Ordering::Relaxed);
    }
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self::new(0.5)
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
