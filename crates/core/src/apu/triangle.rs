//! Triangle wave generator.
//!
//! The triangle channel produces a quantized triangle wave with 32 steps.

use super::length_counter::LengthCounter;
use super::linear_counter::LinearCounter;
use super::oscillator::Oscillator;
use super::sequencer::TriangleSequencer;

/// Triangle channel (`$4008-$400B`).
///
/// The triangle channel has:
/// - 32-step triangle wave (no volume control, fixed output)
/// - Length counter for note duration
/// - Linear counter for additional duration control
/// - No envelope generator (unlike pulse/noise)
#[derive(Debug, Clone)]
pub struct TriangleChannel {
    pub enabled: bool,
    /// Control flag: halts the length counter and holds the linear counter reload
    pub halted: bool,
    pub length_counter: LengthCounter,
    pub linear_counter: LinearCounter,
    pub sequencer: TriangleSequencer,
    pub oscillator: Oscillator,
    output: f64,
}

impl TriangleChannel {
    pub fn new(harmonics: u32) -> Self {
        let mut oscillator = Oscillator::new(harmonics);
        oscillator.amplitude = 1.0;
        Self {
            enabled: false,
            halted: false,
            length_counter: LengthCounter::new(),
            linear_counter: LinearCounter::new(),
            sequencer: TriangleSequencer::new(),
            oscillator,
            output: 0.0,
        }
    }

    /// `$4008`: `CRRR RRRR`
    pub fn write_linear(&mut self, val: u8) {
        self.halted = (val & 0x80) != 0;
        self.linear_counter.reload_value = val & 0x7F;
    }

    /// `$400A`: timer low byte
    pub fn write_timer_low(&mut self, val: u8) {
        self.sequencer.set_reload_low(val);
    }

    /// `$400B`: length index and timer high bits; sets the linear reload flag
    pub fn write_timer_high(&mut self, val: u8) {
        self.sequencer.set_reload_high(val);
        if self.enabled {
            self.length_counter.load(val);
        }
        self.linear_counter.reload_flag = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.counter = 0;
            self.linear_counter.counter = 0;
        }
    }

    /// Quarter frame: linear counter
    pub fn clock_quarter_frame(&mut self) {
        self.linear_counter.clock(self.enabled, self.halted);
    }

    /// Half frame: length counter
    pub fn clock_half_frame(&mut self) {
        self.length_counter.clock(self.enabled, self.halted);
    }

    /// One CPU cycle of the step sequencer
    pub fn clock_timer(&mut self) {
        self.sequencer.clock(self.is_audible());
    }

    pub fn is_audible(&self) -> bool {
        self.enabled && self.length_counter.is_active() && self.linear_counter.is_active()
    }

    /// Current step level. The sequencer holds its step while the counters
    /// gate it, so only a disabled channel reads zero.
    pub fn digital_output(&self) -> u8 {
        if self.enabled {
            self.sequencer.output
        } else {
            0
        }
    }

    pub fn synthesize(&mut self, t: f64, cpu_hz: f64) {
        self.oscillator.frequency = cpu_hz / (32.0 * (self.sequencer.reload as f64 + 2.0));
        self.output = if self.is_audible() {
            self.oscillator.triangle_sample(t)
        } else {
            0.0
        };
    }

    pub fn sample_digital(&mut self) {
        self.output = self.digital_output() as f64 / 15.0;
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> TriangleChannel {
        let mut tri = TriangleChannel::new(5);
        tri.set_enabled(true);
        tri.write_linear(0x10);
        tri.write_timer_low(0x00);
        tri.write_timer_high(0x08); // length index 1 -> 254
        tri.clock_quarter_frame(); // reload linear counter
        tri
    }

    #[test]
    fn sequence_advances_when_counters_nonzero() {
        let mut tri = playing();
        assert_eq!(tri.linear_counter.counter, 0x10);
        tri.clock_timer(); // timer 0 -> underflow
        assert_eq!(tri.sequencer.sequence_index, 1);
    }

    #[test]
    fn sequence_holds_when_linear_counter_zero() {
        let mut tri = TriangleChannel::new(5);
        tri.set_enabled(true);
        tri.write_timer_high(0x08);
        for _ in 0..10 {
            tri.clock_timer();
        }
        assert_eq!(tri.sequencer.sequence_index, 0);
        assert_eq!(tri.digital_output(), 15);
    }

    #[test]
    fn outputs_zero_when_disabled() {
        let mut tri = playing();
        tri.set_enabled(false);
        assert_eq!(tri.length_counter.counter, 0);
        assert_eq!(tri.linear_counter.counter, 0);
        assert_eq!(tri.digital_output(), 0);
    }

    #[test]
    fn linear_counter_runs_out() {
        let mut tri = TriangleChannel::new(5);
        tri.set_enabled(true);
        tri.write_linear(0x02);
        tri.write_timer_high(0x08);
        tri.clock_quarter_frame(); // reload to 2, flag cleared
        tri.clock_quarter_frame();
        tri.clock_quarter_frame();
        assert!(!tri.is_audible());
    }

    #[test]
    fn level_held_when_note_ends() {
        let mut tri = playing();
        for _ in 0..5 {
            tri.clock_timer();
        }
        let level = tri.digital_output();
        assert_eq!(level, tri.sequencer.output);
        assert_ne!(level, 0);

        tri.linear_counter.counter = 0;
        for _ in 0..10 {
            tri.clock_timer();
        }
        assert_eq!(tri.digital_output(), level);
    }

    #[test]
    fn synthesized_output_in_range() {
        let mut tri = playing();
        for i in 0..500 {
            tri.synthesize(i as f64 * 1.0e-5, 1_789_773.0);
            assert!(tri.output() >= -0.05 && tri.output() <= 1.05);
        }
    }
}
