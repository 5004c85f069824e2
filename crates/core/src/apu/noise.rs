//! Noise channel with Linear Feedback Shift Register (LFSR).
//!
//! The noise channel generates pseudo-random noise for percussion and sound effects.

use super::envelope::Envelope;
use super::length_counter::LengthCounter;

/// Noise channel (`$400C-$400F`).
///
/// The noise channel uses a 15-bit LFSR to generate pseudo-random bit sequences.
/// It supports:
/// - Two noise modes (normal and periodic/metallic)
/// - 16 preset period values
/// - Length counter
/// - Envelope generator for volume control
#[derive(Debug, Clone)]
pub struct NoiseChannel {
    pub enabled: bool,
    /// Length counter halt / envelope loop flag
    pub halted: bool,
    /// Mode flag: false = normal, true = periodic (short LFSR period)
    pub mode: bool,
    pub envelope: Envelope,
    pub length_counter: LengthCounter,
    /// 15-bit Linear Feedback Shift Register
    shift_register: u16,
    timer: i16,
    /// Timer period in APU cycles minus one
    reload: u16,
    output: f64,
}

impl NoiseChannel {
    pub fn new() -> Self {
        Self {
            enabled: false,
            halted: false,
            mode: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            shift_register: 1,
            timer: 0,
            reload: 1,
            output: 0.0,
        }
    }

    /// `$400C`: `--LC VVVV`
    pub fn write_control(&mut self, val: u8) {
        self.halted = (val & 0x20) != 0;
        self.envelope.write(val);
    }

    /// `$400E`: `M--- PPPP`. `periods` is the region's table in CPU cycles.
    pub fn write_period(&mut self, val: u8, periods: &[u16; 16]) {
        self.mode = (val & 0x80) != 0;
        // The timer runs once per APU cycle (two CPU cycles)
        self.reload = periods[(val & 0x0F) as usize] / 2 - 1;
    }

    /// `$400F`: length index. Envelope restarts are driven by the APU, which
    /// applies them to every enveloped channel.
    pub fn write_length(&mut self, val: u8) {
        if self.enabled {
            self.length_counter.load(val);
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.counter = 0;
        }
    }

    pub fn clock_quarter_frame(&mut self) {
        self.envelope.clock(self.halted);
    }

    pub fn clock_half_frame(&mut self) {
        self.length_counter.clock(self.enabled, self.halted);
    }

    /// One APU cycle of the LFSR timer
    pub fn clock_timer(&mut self) {
        self.timer -= 1;
        if self.timer == -1 {
            self.timer = self.reload as i16;
            let tap = if self.mode { 6 } else { 1 };
            let feedback = (self.shift_register ^ (self.shift_register >> tap)) & 1;
            self.shift_register = (self.shift_register >> 1) | (feedback << 14);
        }
    }

    pub fn period(&self) -> u16 {
        self.reload + 1
    }

    pub fn shift_register(&self) -> u16 {
        self.shift_register
    }

    pub fn digital_output(&self) -> u8 {
        if self.enabled && self.length_counter.is_active() && (self.shift_register & 1) == 0 {
            self.envelope.output()
        } else {
            0
        }
    }

    /// Noise has no band-limited form; it always mixes its digital level
    pub fn sample_digital(&mut self) {
        self.output = self.digital_output() as f64 / 15.0;
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}

impl Default for NoiseChannel {
    fn default() -> Self {
        Self::new()
    }
}
