//! NES APU (Audio Processing Unit) components.
//!
//! The units here compose into the [`Rp2a03Apu`], the audio half of the
//! 2A03/2A07 CPU package. Each unit is usable on its own and is tested in
//! isolation.
//!
//! ## Components
//!
//! - **Pulse Channel**: Square wave generator with duty cycle control and sweep
//! - **Triangle Channel**: 32-step triangle wave generator with linear counter
//! - **Noise Channel**: Pseudo-random noise generator using LFSR
//! - **DMC Channel**: Register file and sample fetch pacing (silent output)
//! - **Length Counter**: Automatic note duration control
//! - **Envelope**: Volume envelope generator with decay
//! - **Sweep**: Automatic pitch bend for the pulse channels
//! - **Oscillator**: Band-limited additive synthesis for pulse and triangle
//! - **Frame Counter**: Timing controller for envelope and length counter units
//! - **Mixer**: Linear approximation of the 2A03 output mix
//!
//! ## Timing Support
//!
//! All components support both NTSC and PAL timing modes for accurate emulation
//! of regional console variants.

pub mod audio_chip;
pub mod dmc;
pub mod envelope;
pub mod frame_counter;
pub mod length_counter;
pub mod linear_counter;
pub mod memory_reader;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod pulse;
pub mod rp2a03;
pub mod sequencer;
pub mod shared;
pub mod sweep;
pub mod timing;
pub mod triangle;

pub use audio_chip::AudioChip;
pub use dmc::DmcChannel;
pub use envelope::Envelope;
pub use frame_counter::FrameCounter;
pub use length_counter::{LengthCounter, LENGTH_TABLE};
pub use linear_counter::LinearCounter;
pub use memory_reader::{CpuBus, MemoryReader};
pub use mixer::MasterVolume;
pub use noise::NoiseChannel;
pub use oscillator::Oscillator;
pub use pulse::PulseChannel;
pub use rp2a03::Rp2a03Apu;
pub use sequencer::{DutyCycle, PulseSequencer, TriangleSequencer, TRIANGLE_TABLE};
pub use shared::SharedApu;
pub use sweep::{PulseId, Sweep};
pub use timing::TimingMode;
pub use triangle::TriangleChannel;
