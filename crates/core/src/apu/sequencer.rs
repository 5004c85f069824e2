//! Waveform step sequencers.
//!
//! Both sequencers share the same timer mechanics: the timer counts down once
//! per clock and, on underflow, reloads to `reload + 1` and advances the
//! waveform by one step, so a step lasts `reload + 2` clocks.
//! The pulse sequencer rotates an 8-bit duty pattern; the triangle sequencer
//! walks a fixed 32-entry ramp.

/// Triangle channel 32-step waveform: 15 down to 0, then 0 up to 15.
pub const TRIANGLE_TABLE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    13, 14, 15,
];

/// Pulse duty cycle selected by bits 6-7 of `$4000`/`$4004`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DutyCycle {
    /// 12.5%
    #[default]
    Eighth,
    /// 25%
    Quarter,
    /// 50%
    Half,
    /// 75% (25% negated)
    ThreeQuarters,
}

impl DutyCycle {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => DutyCycle::Eighth,
            1 => DutyCycle::Quarter,
            2 => DutyCycle::Half,
            _ => DutyCycle::ThreeQuarters,
        }
    }

    /// 8-step bit pattern, consumed from the low bit by rotating right
    pub fn pattern(self) -> u8 {
        match self {
            DutyCycle::Eighth => 0b0100_0000,
            DutyCycle::Quarter => 0b0110_0000,
            DutyCycle::Half => 0b0111_1000,
            DutyCycle::ThreeQuarters => 0b1001_1111,
        }
    }

    /// Fraction of the period spent high
    pub fn fraction(self) -> f64 {
        match self {
            DutyCycle::Eighth => 0.125,
            DutyCycle::Quarter => 0.25,
            DutyCycle::Half => 0.5,
            DutyCycle::ThreeQuarters => 0.75,
        }
    }
}

/// Pulse duty sequencer.
#[derive(Debug, Clone, Default)]
pub struct PulseSequencer {
    /// Duty pattern, rotated one bit per step
    pub sequence: u8,
    /// Pattern loaded into `sequence` when a note is triggered
    pub duty: DutyCycle,
    pub timer: i16,
    /// 11-bit timer period
    pub reload: u16,
    /// Current output bit (0 or 1)
    pub output: u8,
}

impl PulseSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the timer; on underflow rotate the duty pattern by one step.
    pub fn clock(&mut self, enabled: bool) -> u8 {
        if enabled {
            self.timer -= 1;
            if self.timer == -1 {
                self.timer = self.reload as i16 + 1;
                self.sequence = rotate_duty(self.sequence);
                self.output = self.sequence & 0x01;
            }
        }
        self.output
    }

    /// Restart the waveform at step 0 (writes to `$4003`/`$4007`)
    pub fn restart(&mut self) {
        self.sequence = self.duty.pattern();
        self.timer = self.reload as i16;
    }

    pub fn set_reload_low(&mut self, val: u8) {
        self.reload = (self.reload & 0xFF00) | val as u16;
    }

    pub fn set_reload_high(&mut self, val: u8) {
        self.reload = (((val & 0x07) as u16) << 8) | (self.reload & 0x00FF);
    }
}

/// Rotate an 8-bit duty pattern right by one step, wrapping bit 0 into bit 7.
pub fn rotate_duty(sequence: u8) -> u8 {
    sequence.rotate_right(1)
}

/// Triangle step sequencer.
#[derive(Debug, Clone, Default)]
pub struct TriangleSequencer {
    /// Position in [`TRIANGLE_TABLE`] (0-31)
    pub sequence_index: u8,
    pub timer: i16,
    /// 11-bit timer period
    pub reload: u16,
    /// Current table value (0-15)
    pub output: u8,
}

impl TriangleSequencer {
    pub fn new() -> Self {
        Self {
            output: TRIANGLE_TABLE[0],
            ..Self::default()
        }
    }

    /// Clock the timer. `enabled` carries the channel's gating policy
    /// (enabled, linear counter and length counter all non-zero).
    pub fn clock(&mut self, enabled: bool) -> u8 {
        if enabled {
            self.timer -= 1;
            if self.timer == -1 {
                self.timer = self.reload as i16 + 1;
                self.sequence_index = (self.sequence_index + 1) & 0x1F;
                self.output = TRIANGLE_TABLE[self.sequence_index as usize];
            }
        }
        self.output
    }

    pub fn set_reload_low(&mut self, val: u8) {
        self.reload = (self.reload & 0xFF00) | val as u16;
    }

    pub fn set_reload_high(&mut self, val: u8) {
        self.reload = (((val & 0x07) as u16) << 8) | (self.reload & 0x00FF);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collect one full period of output bits for a duty cycle
    fn duty_bits(duty: DutyCycle) -> Vec<u8> {
        let mut seq = PulseSequencer::new();
        seq.duty = duty;
        seq.reload = 0;
        seq.restart();
        // Steps last two clocks at reload 0; the first clock underflows
        (0..16).map(|_| seq.clock(true)).step_by(2).collect()
    }

    #[test]
    fn duty_patterns_have_expected_high_fraction() {
        for duty in [
            DutyCycle::Eighth,
            DutyCycle::Quarter,
            DutyCycle::Half,
            DutyCycle::ThreeQuarters,
        ] {
            let high = duty_bits(duty).iter().filter(|&&b| b == 1).count();
            assert_eq!(high as f64 / 8.0, duty.fraction(), "{:?}", duty);
        }
    }

    #[test]
    fn rotate_wraps_low_bit_to_top() {
        assert_eq!(rotate_duty(0b0000_0001), 0b1000_0000);
        assert_eq!(rotate_duty(0b0100_0000), 0b0010_0000);
        let mut s = DutyCycle::ThreeQuarters.pattern();
        for _ in 0..8 {
            s = rotate_duty(s);
        }
        assert_eq!(s, DutyCycle::ThreeQuarters.pattern());
    }

    #[test]
    fn pulse_timer_reloads_to_period_plus_one() {
        let mut seq = PulseSequencer::new();
        seq.duty = DutyCycle::Half;
        seq.reload = 3;
        seq.restart();
        let start = seq.sequence;

        for _ in 0..3 {
            seq.clock(true);
        }
        assert_eq!(seq.sequence, start);
        seq.clock(true);
        assert_eq!(seq.sequence, rotate_duty(start));
        assert_eq!(seq.timer, 4);

        // Every later step lasts reload + 2 clocks
        for _ in 0..4 {
            seq.clock(true);
        }
        assert_eq!(seq.sequence, rotate_duty(start));
        seq.clock(true);
        assert_eq!(seq.sequence, rotate_duty(rotate_duty(start)));
    }

    #[test]
    fn triangle_timer_reloads_to_period_plus_one() {
        let mut tri = TriangleSequencer::new();
        tri.reload = 3;
        tri.timer = 0;
        tri.clock(true);
        assert_eq!(tri.sequence_index, 1);
        assert_eq!(tri.timer, 4);

        for _ in 0..4 {
            tri.clock(true);
        }
        assert_eq!(tri.sequence_index, 1);
        tri.clock(true);
        assert_eq!(tri.sequence_index, 2);
    }

    #[test]
    fn disabled_pulse_sequencer_holds() {
        let mut seq = PulseSequencer::new();
        seq.reload = 0;
        seq.restart();
        let start = seq.sequence;
        for _ in 0..10 {
            seq.clock(false);
        }
        assert_eq!(seq.sequence, start);
    }

    #[test]
    fn reload_byte_halves_combine() {
        let mut seq = PulseSequencer::new();
        seq.set_reload_low(0xAB);
        seq.set_reload_high(0xFD); // only low 3 bits used
        assert_eq!(seq.reload, 0x5AB);
        seq.set_reload_low(0x01);
        assert_eq!(seq.reload, 0x501);
    }

    #[test]
    fn triangle_walks_ramp_and_wraps() {
        let mut tri = TriangleSequencer::new();
        tri.reload = 0;
        let outputs: Vec<u8> = (0..64).map(|_| tri.clock(true)).step_by(2).collect();
        assert_eq!(outputs[0], 14);
        assert_eq!(outputs[14], 0);
        assert_eq!(outputs[15], 0);
        assert_eq!(outputs[30], 15);
        assert_eq!(outputs[31], 15); // wrapped back to index 0
        assert_eq!(tri.sequence_index, 0);
    }

    #[test]
    fn triangle_gated_by_enable() {
        let mut tri = TriangleSequencer::new();
        tri.reload = 0;
        tri.clock(false);
        assert_eq!(tri.sequence_index, 0);
        tri.clock(true);
        assert_eq!(tri.sequence_index, 1);
    }
}
