//! Band-limited oscillator.
//!
//! Rebuilds the pulse and triangle waveforms from a finite number of sine
//! harmonics so the synthesized output carries no energy above the
//! `harmonics`-th multiple of the fundamental. Sine terms come from
//! [`fast_sin`], a parabolic approximation that is far cheaper than
//! `f64::sin` in the per-tick path.

use std::f64::consts::{PI, TAU};

/// Default harmonic count for the pulse channels
pub const DEFAULT_SQUARE_HARMONICS: u32 = 10;
/// Default harmonic count for the triangle channel
pub const DEFAULT_TRIANGLE_HARMONICS: u32 = 5;

/// Parabolic sine approximation with one precision step.
///
/// Accepts any finite input; the argument is wrapped into `[-PI, PI)` first.
/// Maximum absolute error against `f64::sin` is about 0.001.
pub fn fast_sin(x: f64) -> f64 {
    const B: f64 = 4.0 / PI;
    const C: f64 = -4.0 / (PI * PI);
    const P: f64 = 0.225;

    let x = x - TAU * ((x + PI) / TAU).floor();
    let y = B * x + C * x * x.abs();
    P * (y * y.abs() - y) + y
}

/// Harmonic-summing oscillator for one channel.
///
/// The channel updates `frequency`, `duty_cycle` and `amplitude` from its
/// register state each APU tick; sampling is a pure function of those fields
/// and the time argument.
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Fundamental frequency in Hz
    pub frequency: f64,
    /// Low fraction of the period (pulse only)
    pub duty_cycle: f64,
    /// Peak output level (0.0-1.0)
    pub amplitude: f64,
    harmonics: u32,
}

impl Oscillator {
    /// Create an oscillator summing `harmonics` terms (at least one is always used)
    pub fn new(harmonics: u32) -> Self {
        Self {
            frequency: 0.0,
            duty_cycle: 0.5,
            amplitude: 0.0,
            harmonics: harmonics.max(1),
        }
    }

    pub fn harmonics(&self) -> u32 {
        self.harmonics
    }

    pub fn set_harmonics(&mut self, harmonics: u32) {
        self.harmonics = harmonics.max(1);
    }

    /// Band-limited pulse sample at time `t` (seconds), in `[0, amplitude]`
    /// apart from Gibbs ringing at the edges.
    ///
    /// Built as the difference of two sawtooth series, the second shifted by
    /// the duty fraction, plus the DC term `amplitude * (1 - duty)`. The
    /// wave is low for the first `duty_cycle` of each period and high for
    /// the rest, so callers pass `1 - high fraction`.
    pub fn square_sample(&self, t: f64) -> f64 {
        let phase = TAU * self.frequency * t;
        let shift = TAU * self.duty_cycle;
        let mut a = 0.0;
        let mut b = 0.0;

        for n in 1..=self.harmonics {
            let n = n as f64;
            a += -fast_sin(n * phase) / n;
            b += -fast_sin(n * (phase - shift)) / n;
        }

        (self.amplitude / PI) * (a - b) + self.amplitude * (1.0 - self.duty_cycle)
    }

    /// Band-limited triangle sample at time `t` (seconds), in `[0, amplitude]`.
    ///
    /// Odd harmonics only, weighted `1/(2i+1)^2` with alternating sign.
    pub fn triangle_sample(&self, t: f64) -> f64 {
        let phase = TAU * self.frequency * t;
        let mut sum = 0.0;

        for i in 0..self.harmonics {
            let k = (2 * i + 1) as f64;
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += sign * fast_sin(k * phase) / (k * k);
        }

        let wave = sum * 8.0 / (PI * PI);
        self.amplitude * 0.5 * (1.0 + wave)
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(DEFAULT_SQUARE_HARMONICS)
    }
}
