//! Length counter used by pulse, triangle, and noise channels.
//!
//! The length counter provides automatic note duration control.

/// NES length counter lookup table.
///
/// This table is indexed by a 5-bit value (0-31) and returns the length counter value.
/// The counter is clocked at half the frame counter rate (~120Hz NTSC, ~100Hz PAL).
pub const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Length counter component.
///
/// Counts down on half frames; when it reaches zero the owning channel is silenced.
#[derive(Debug, Clone, Default)]
pub struct LengthCounter {
    pub counter: u8,
}

impl LengthCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock the length counter (half frame).
    ///
    /// A disabled channel forces the counter to zero; otherwise it decrements
    /// unless halted.
    pub fn clock(&mut self, enabled: bool, halted: bool) {
        if !enabled {
            self.counter = 0;
        } else if self.counter > 0 && !halted {
            self.counter -= 1;
        }
    }

    /// Load from the length table using the upper five bits of a register write
    pub fn load(&mut self, val: u8) {
        self.counter = LENGTH_TABLE[((val >> 3) & 0x1F) as usize];
    }

    /// Check if the counter is non-zero (channel should be active)
    pub fn is_active(&self) -> bool {
        self.counter > 0
    }
}
