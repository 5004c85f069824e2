//! Cycle-stepped emulation of the NES 2A03 audio processing unit.
//!
//! The CPU core drives an [`apu::Rp2a03Apu`] through the [`apu::AudioChip`]
//! boundary: register writes and reads at `$4000-$4017`, one `clock` per
//! system tick, and an IRQ poll per instruction. The audio sink pulls mixed
//! samples in `[-1, 1]`.

pub mod apu;
pub mod config;
pub mod logging;

pub use apu::{AudioChip, CpuBus, MasterVolume, Rp2a03Apu, SharedApu, TimingMode};
pub use config::{ApuConfig, ConfigError};
