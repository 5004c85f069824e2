//! Audio chip trait: the boundary between a CPU core and an APU.
//!
//! The CPU writes and reads registers, steps the chip once per system tick
//! and polls the IRQ line between instructions. An audio sink pulls mixed
//! samples.

use super::TimingMode;

/// A trait for audio chips driven by a cycle-stepped CPU.
pub trait AudioChip {
    /// Write to a register on the audio chip
    fn write_register(&mut self, addr: u16, val: u8);

    /// Read from a register on the audio chip (if supported)
    fn read_register(&self, addr: u16) -> u8 {
        let _ = addr;
        0 // Default: no readable registers
    }

    /// Advance the chip by one system tick. `sampling` enables the
    /// band-limited synthesis path.
    fn clock(&mut self, sampling: bool);

    /// Current mixed output sample
    fn sample(&self) -> f64;

    /// Return the pending IRQ flag and clear it
    fn irq(&mut self) -> bool {
        false
    }

    /// Reset the chip to power-on state
    fn reset(&mut self);

    /// Get the timing mode of this chip (NTSC/PAL)
    fn timing(&self) -> TimingMode;

    /// Step the chip `ticks_per_sample` ticks at a time, with sampling on,
    /// and collect the mixed sample after each step. No filtering is applied.
    fn generate_samples(&mut self, ticks_per_sample: usize, count: usize) -> Vec<f64> {
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            for _ in 0..ticks_per_sample {
                self.clock(true);
            }
            samples.push(self.sample());
        }
        samples
    }
}
