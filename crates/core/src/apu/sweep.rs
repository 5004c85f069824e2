//! Frequency sweep unit for the pulse channels.
//!
//! The sweep unit periodically adds to or subtracts from a pulse channel's
//! timer period, bending its pitch. It also mutes the channel when the period
//! leaves the audible range.
//!
//! The two pulse channels differ in one detail: pulse 1 negates with one's
//! complement (subtracting `change + 1`) while pulse 2 uses two's complement
//! (subtracting `change`).

/// Which of the two pulse channels a sweep unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PulseId {
    #[default]
    One,
    Two,
}

/// Sweep unit state (`$4001`/`$4005`).
#[derive(Debug, Clone, Default)]
pub struct Sweep {
    pub enabled: bool,
    /// Subtract instead of add
    pub negate: bool,
    /// Reload the divider on the next clock
    pub reload: bool,
    /// Channel is silenced because the period is out of range
    pub muted: bool,
    /// Shift count (0-7)
    pub shift: u8,
    /// Divider period (0-7)
    pub period: u8,
    timer: u8,
    /// Last computed change amount (`period >> shift`)
    change: u16,
}

/// Periods below this are inaudible and mute the channel
const MIN_PERIOD: u16 = 8;
/// Periods above this overflow the 11-bit timer and mute the channel
const MAX_PERIOD: u16 = 0x7FF;

fn out_of_range(period: u16) -> bool {
    period < MIN_PERIOD || period > MAX_PERIOD
}

impl Sweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a `$4001`/`$4005` write: `EPPP NSSS`
    pub fn write(&mut self, val: u8) {
        self.enabled = (val & 0x80) != 0;
        self.period = (val >> 4) & 0x07;
        self.negate = (val & 0x08) != 0;
        self.shift = val & 0x07;
        self.reload = true;
    }

    /// Recompute the change amount and mute state for the channel's current period.
    pub fn track(&mut self, target_period: u16) {
        if self.enabled {
            self.change = target_period >> self.shift;
        }
        self.muted = out_of_range(target_period);
    }

    /// Clock the sweep divider (half frame), rewriting `target_period` when the
    /// divider fires. Returns true if the period changed.
    pub fn clock(&mut self, target_period: &mut u16, channel: PulseId) -> bool {
        let mut changed = false;

        if self.timer == 0 && self.enabled && self.shift > 0 && !self.muted {
            self.change = *target_period >> self.shift;
            *target_period = self.target(*target_period, channel);
            changed = true;
        }

        if self.timer == 0 || self.reload {
            self.timer = self.period;
            self.reload = false;
        } else {
            self.timer -= 1;
        }

        self.muted = out_of_range(*target_period);
        changed
    }

    /// Period the sweep would produce from `current` with the tracked change amount
    fn target(&self, current: u16, channel: PulseId) -> u16 {
        if self.negate {
            let complement = match channel {
                PulseId::One => 1,
                PulseId::Two => 0,
            };
            current.saturating_sub(self.change + complement)
        } else {
            current + self.change
        }
    }

    pub fn change(&self) -> u16 {
        self.change
    }
}
