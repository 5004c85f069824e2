//! Frame counter that drives envelope, length counter, and sweep units.
//!
//! The frame counter counts APU cycles and emits quarter-frame and
//! half-frame clocks at fixed offsets into the sequence (about 240Hz on
//! NTSC, 200Hz on PAL).

use std::cell::Cell;

use super::timing::TimingMode;
use crate::logging::{log, LogCategory, LogLevel};

/// APU cycles between a `$4017` write and the sequence reset
const RESET_DELAY: i8 = 4;

/// Frame counter component.
///
/// Supports two modes:
/// - 4-step mode: quarter clocks at steps 1-4, half clocks at 2 and 4,
///   frame IRQ at step 4 unless inhibited
/// - 5-step mode: the last step moves later and never raises the IRQ
///
/// A `$4017` write takes effect a few cycles late: the sequence is reset to
/// zero once the pending write counts down, and in 5-step mode the reset
/// also produces an immediate quarter and half clock.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    /// APU cycles into the current sequence
    frame_counter: u16,
    /// Current mode: false = 4-step, true = 5-step
    five_step: bool,
    irq_inhibit: bool,
    /// Frame IRQ flag; a `Cell` so status reads through `&self` can acknowledge it
    frame_irq: Cell<bool>,
    /// Countdown to the delayed reset, negative when no write is pending
    pending_4017_write: i8,
    timing: TimingMode,
}

impl FrameCounter {
    pub fn new(timing: TimingMode) -> Self {
        Self {
            frame_counter: 0,
            five_step: false,
            irq_inhibit: false,
            frame_irq: Cell::new(false),
            pending_4017_write: -1,
            timing,
        }
    }

    /// Clock the frame counter for one APU cycle.
    /// Returns (quarter_frame, half_frame) signals.
    pub fn clock(&mut self) -> (bool, bool) {
        let mut quarter = false;
        let mut half = false;

        if self.pending_4017_write >= 0 {
            self.pending_4017_write -= 2;
            if self.pending_4017_write <= 0 {
                self.frame_counter = 0;
                if self.five_step {
                    quarter = true;
                    half = true;
                }
                self.pending_4017_write = -1;
            }
        }

        self.frame_counter += 1;

        let steps = self.timing.frame_steps(self.five_step);
        if self.frame_counter == steps[0] || self.frame_counter == steps[2] {
            quarter = true;
        } else if self.frame_counter == steps[1] {
            quarter = true;
            half = true;
        } else if self.frame_counter == steps[3] {
            quarter = true;
            half = true;
            if !self.five_step && !self.irq_inhibit {
                self.frame_irq.set(true);
                log(LogCategory::Interrupts, LogLevel::Debug, || {
                    "Frame IRQ raised".to_string()
                });
            }
            self.frame_counter = 0;
        }

        (quarter, half)
    }

    /// Write to the frame counter control register ($4017): `MI-- ----`
    pub fn write_control(&mut self, value: u8) {
        self.five_step = (value & 0x80) != 0;
        self.irq_inhibit = (value & 0x40) != 0;

        if self.irq_inhibit {
            self.frame_irq.set(false);
        }

        self.pending_4017_write = RESET_DELAY;

        log(LogCategory::FrameCounter, LogLevel::Debug, || {
            format!(
                "$4017 <- {:02X}: {}-step, IRQ {}",
                value,
                if self.five_step { 5 } else { 4 },
                if self.irq_inhibit { "inhibited" } else { "enabled" }
            )
        });
    }

    pub fn is_irq_pending(&self) -> bool {
        self.frame_irq.get()
    }

    /// Return the IRQ flag and clear it
    pub fn take_irq(&self) -> bool {
        self.frame_irq.replace(false)
    }

    pub fn five_step(&self) -> bool {
        self.five_step
    }

    pub fn irq_inhibit(&self) -> bool {
        self.irq_inhibit
    }

    /// APU cycles into the current sequence
    pub fn position(&self) -> u16 {
        self.frame_counter
    }

    pub fn timing(&self) -> TimingMode {
        self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `cycles` APU cycles, collecting the cycle numbers (1-based) of
    /// every quarter and half clock
    fn trace(fc: &mut FrameCounter, cycles: u32) -> (Vec<u32>, Vec<u32>) {
        let mut quarters = Vec::new();
        let mut halves = Vec::new();
        for cycle in 1..=cycles {
            let (q, h) = fc.clock();
            if q {
                quarters.push(cycle);
            }
            if h {
                halves.push(cycle);
            }
        }
        (quarters, halves)
    }

    #[test]
    fn four_step_offsets() {
        let mut fc = FrameCounter::new(TimingMode::Ntsc);
        let (quarters, halves) = trace(&mut fc, 14916);
        assert_eq!(quarters, vec![3729, 7457, 11186, 14916]);
        assert_eq!(halves, vec![7457, 14916]);
        assert!(fc.is_irq_pending());
        assert_eq!(fc.position(), 0);
    }

    #[test]
    fn five_step_offsets_and_no_irq() {
        let mut fc = FrameCounter::new(TimingMode::Ntsc);
        fc.write_control(0x80);
        let (quarters, halves) = trace(&mut fc, 18641 + 1);
        // The delayed reset lands on cycle 2, clocks everything once and
        // restarts the sequence, so every step shifts by one cycle
        assert_eq!(quarters, vec![2, 3730, 7458, 11187, 18642]);
        assert_eq!(halves, vec![2, 7458, 18642]);
        assert!(!fc.is_irq_pending());
    }

    #[test]
    fn irq_suppressed_when_inhibited() {
        let mut fc = FrameCounter::new(TimingMode::Ntsc);
        fc.write_control(0x40);
        trace(&mut fc, 20_000);
        assert!(!fc.is_irq_pending());
    }

    #[test]
    fn inhibit_clears_pending_irq() {
        let mut fc = FrameCounter::new(TimingMode::Ntsc);
        trace(&mut fc, 14916);
        assert!(fc.is_irq_pending());
        fc.write_control(0x40);
        assert!(!fc.is_irq_pending());
    }

    #[test]
    fn take_irq_clears_flag() {
        let mut fc = FrameCounter::new(TimingMode::Ntsc);
        trace(&mut fc, 14916);
        assert!(fc.take_irq());
        assert!(!fc.take_irq());
    }

    #[test]
    fn write_resets_sequence_after_delay() {
        let mut fc = FrameCounter::new(TimingMode::Ntsc);
        trace(&mut fc, 1000);
        fc.write_control(0x00);
        fc.clock();
        assert_eq!(fc.position(), 1001);
        fc.clock();
        assert_eq!(fc.position(), 1);
    }

    #[test]
    fn four_step_write_has_no_extra_clock() {
        let mut fc = FrameCounter::new(TimingMode::Ntsc);
        fc.write_control(0x00);
        let (quarters, halves) = trace(&mut fc, 3729 + 1);
        assert_eq!(quarters, vec![3730]);
        assert!(halves.is_empty());
    }

    #[test]
    fn pal_uses_longer_sequence() {
        let mut fc = FrameCounter::new(TimingMode::Pal);
        let (quarters, _) = trace(&mut fc, 16626);
        assert_eq!(quarters, vec![4156, 8313, 12469, 16626]);
    }
}
