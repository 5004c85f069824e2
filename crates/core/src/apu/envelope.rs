//! Envelope generator for volume control.
//!
//! The envelope generator provides automatic volume fade-out for pulse and noise channels.

/// Envelope generator component.
///
/// Decays from 15 to 0 at a rate set by `volume`, optionally looping, or
/// outputs `volume` directly in constant-volume mode.
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    /// Start flag (set when a note is triggered)
    pub started: bool,
    /// Constant volume mode: output `volume` instead of the decay level
    pub disabled: bool,
    /// Volume / divider period (4-bit)
    pub volume: u8,
    /// Divider counter
    divider_count: u16,
    /// Decay level counter (0-15)
    decay_count: u8,
    /// Current output (0-15)
    output: u8,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the envelope (quarter frame).
    ///
    /// `loop_flag` is the channel's length-counter-halt bit, which doubles as
    /// the envelope loop flag.
    pub fn clock(&mut self, loop_flag: bool) {
        if self.started {
            self.started = false;
            self.decay_count = 15;
            self.divider_count = self.volume as u16;
        } else if self.divider_count == 0 {
            self.divider_count = self.volume as u16;
            if self.decay_count == 0 {
                if loop_flag {
                    self.decay_count = 15;
                }
            } else {
                self.decay_count -= 1;
            }
        } else {
            self.divider_count -= 1;
        }

        self.output = if self.disabled {
            self.volume
        } else {
            self.decay_count
        };
    }

    /// Apply a `DDLC VVVV` style register write (constant volume + volume bits)
    pub fn write(&mut self, val: u8) {
        self.disabled = (val & 0x10) != 0;
        self.volume = val & 0x0F;
        // Constant volume takes effect immediately, not at the next quarter frame
        self.output = if self.disabled {
            self.volume
        } else {
            self.decay_count
        };
    }

    /// Restart the envelope on the next clock
    pub fn restart(&mut self) {
        self.started = true;
    }

    /// Current output level (0-15)
    pub fn output(&self) -> u8 {
        self.output
    }

    /// Current decay level (0-15)
    pub fn decay_count(&self) -> u8 {
        self.decay_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_flag_reloads_decay_level() {
        let mut env = Envelope::new();
        env.started = true;
        env.clock(false);
        assert!(!env.started);
        assert_eq!(env.decay_count(), 15);
        assert_eq!(env.output(), 15);
    }

    #[test]
    fn volume_three_decays_every_fourth_clock() {
        let mut env = Envelope::new();
        env.volume = 3;
        env.restart();
        env.clock(false); // start: decay = 15, divider = 3

        for expected in [14u8, 13, 12, 11] {
            for _ in 0..3 {
                let before = env.decay_count();
                env.clock(false);
                assert_eq!(env.decay_count(), before);
            }
            env.clock(false);
            assert_eq!(env.decay_count(), expected);
        }
    }

    #[test]
    fn decay_stops_at_zero_without_loop() {
        let mut env = Envelope::new();
        env.restart();
        env.clock(false);
        for _ in 0..40 {
            env.clock(false);
        }
        assert_eq!(env.output(), 0);
    }

    #[test]
    fn loop_flag_reloads_fifteen() {
        let mut env = Envelope::new();
        env.restart();
        env.clock(true);
        // 15 clocks walk 14..=0
        for expected in (0..15).rev() {
            env.clock(true);
            assert_eq!(env.decay_count(), expected);
        }
        env.clock(true);
        assert_eq!(env.decay_count(), 15);
    }

    #[test]
    fn constant_volume_outputs_volume() {
        let mut env = Envelope::new();
        env.write(0x10 | 0x07);
        assert_eq!(env.output(), 7);
        env.restart();
        env.clock(false);
        assert_eq!(env.output(), 7);
        assert_eq!(env.decay_count(), 15);
    }
}
