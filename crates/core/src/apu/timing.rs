//! APU timing configuration for different console regions.

use serde::{Deserialize, Serialize};

/// Console region timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    /// NTSC (North America, Japan) - 1.789773 MHz CPU clock
    #[default]
    Ntsc,
    /// PAL (Europe, Australia) - 1.662607 MHz CPU clock
    Pal,
}

/// Frame sequencer step offsets in APU cycles, 4-step mode (NTSC)
const FRAME_STEPS_4_NTSC: [u16; 4] = [3729, 7457, 11186, 14916];
/// Frame sequencer step offsets in APU cycles, 5-step mode (NTSC)
const FRAME_STEPS_5_NTSC: [u16; 4] = [3729, 7457, 11186, 18641];
/// Frame sequencer step offsets in APU cycles, 4-step mode (PAL)
const FRAME_STEPS_4_PAL: [u16; 4] = [4156, 8313, 12469, 16626];
/// Frame sequencer step offsets in APU cycles, 5-step mode (PAL)
const FRAME_STEPS_5_PAL: [u16; 4] = [4156, 8313, 12469, 20782];

/// NTSC noise period lookup table (CPU cycles)
const NOISE_PERIOD_TABLE_NTSC: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// PAL noise period lookup table (CPU cycles)
const NOISE_PERIOD_TABLE_PAL: [u16; 16] = [
    4, 8, 14, 30, 60, 88, 118, 148, 188, 236, 354, 472, 708, 944, 1890, 3778,
];

/// NTSC DMC rate table (CPU cycles between output bits)
const DMC_RATE_TABLE_NTSC: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// PAL DMC rate table (CPU cycles between output bits)
const DMC_RATE_TABLE_PAL: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];

impl TimingMode {
    /// Get the CPU clock frequency in Hz for this timing mode
    pub fn cpu_clock_hz(&self) -> f64 {
        match self {
            TimingMode::Ntsc => 1_789_773.0,
            TimingMode::Pal => 1_662_607.0,
        }
    }

    /// Frame sequencer step offsets (APU cycles) for the selected mode.
    ///
    /// The last entry is where the sequence wraps back to zero.
    pub fn frame_steps(&self, five_step: bool) -> &'static [u16; 4] {
        match (self, five_step) {
            (TimingMode::Ntsc, false) => &FRAME_STEPS_4_NTSC,
            (TimingMode::Ntsc, true) => &FRAME_STEPS_5_NTSC,
            (TimingMode::Pal, false) => &FRAME_STEPS_4_PAL,
            (TimingMode::Pal, true) => &FRAME_STEPS_5_PAL,
        }
    }

    /// Noise channel period table, in CPU cycles
    pub fn noise_periods(&self) -> &'static [u16; 16] {
        match self {
            TimingMode::Ntsc => &NOISE_PERIOD_TABLE_NTSC,
            TimingMode::Pal => &NOISE_PERIOD_TABLE_PAL,
        }
    }

    /// DMC rate table, in CPU cycles
    pub fn dmc_rates(&self) -> &'static [u16; 16] {
        match self {
            TimingMode::Ntsc => &DMC_RATE_TABLE_NTSC,
            TimingMode::Pal => &DMC_RATE_TABLE_PAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_frame_steps_match_hardware() {
        assert_eq!(
            TimingMode::Ntsc.frame_steps(false),
            &[3729, 7457, 11186, 14916]
        );
        assert_eq!(
            TimingMode::Ntsc.frame_steps(true),
            &[3729, 7457, 11186, 18641]
        );
    }

    #[test]
    fn pal_is_slower_than_ntsc() {
        assert!(TimingMode::Pal.cpu_clock_hz() < TimingMode::Ntsc.cpu_clock_hz());
        assert!(TimingMode::Pal.frame_steps(false)[3] > TimingMode::Ntsc.frame_steps(false)[3]);
    }

    #[test]
    fn timing_mode_serializes_lowercase() {
        let json = serde_json::to_string(&TimingMode::Pal).expect("serialize");
        assert_eq!(json, "\"pal\"");
        let back: TimingMode = serde_json::from_str("\"ntsc\"").expect("deserialize");
        assert_eq!(back, TimingMode::Ntsc);
    }
}
