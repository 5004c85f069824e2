//! RP2A03 audio processing unit.
//!
//! Owns the five channels and the frame counter, decodes the `$4000-$4017`
//! register file and produces one mixed sample per step.
//!
//! ## Register Interface
//!
//! - **$4000-$4003**: Pulse channel 1 (duty, envelope, sweep, frequency, length)
//! - **$4004-$4007**: Pulse channel 2 (same as pulse 1)
//! - **$4008-$400B**: Triangle channel (control, linear counter, frequency, length)
//! - **$400C-$400F**: Noise channel (envelope, mode/period, length)
//! - **$4010-$4013**: DMC channel (register file only, output is silent)
//! - **$4015**: Status/enable register
//! - **$4017**: Frame counter mode and IRQ control
//!
//! ## Timing
//!
//! One call to [`Rp2a03Apu::clock`] is one system tick. Six ticks make one
//! APU cycle (two CPU cycles): the frame counter, the pulse and noise timers
//! and the DMC advance once per APU cycle, and the triangle timer advances
//! every third tick (once per CPU cycle).

use super::dmc::DmcChannel;
use super::frame_counter::FrameCounter;
use super::memory_reader::CpuBus;
use super::mixer::{mix, MasterVolume};
use super::noise::NoiseChannel;
use super::pulse::PulseChannel;
use super::sweep::PulseId;
use super::triangle::TriangleChannel;
use super::{AudioChip, TimingMode};
use crate::config::{ApuConfig, ConfigError};
use crate::logging::{log, LogCategory, LogLevel};

/// System ticks per APU cycle
const TICKS_PER_APU_CYCLE: u8 = 6;
/// System ticks per triangle timer step
const TICKS_PER_CPU_CYCLE: u8 = 3;

/// RP2A03 APU.
///
/// The audio processing unit of the NES console. The region tables
/// (NTSC or PAL) come from the [`ApuConfig`] it is built with.
#[derive(Debug)]
pub struct Rp2a03Apu {
    pub pulse1: PulseChannel,
    pub pulse2: PulseChannel,
    pub triangle: TriangleChannel,
    pub noise: NoiseChannel,
    pub dmc: DmcChannel,
    frame_counter: FrameCounter,
    /// Divider phase within the current APU cycle (0-5)
    clock_counter: u8,
    /// Emulated time in seconds, used as the oscillator phase source
    total_time: f64,
    volume: MasterVolume,
    config: ApuConfig,
    sample: f64,
}

impl Rp2a03Apu {
    /// Create an APU with the default configuration (NTSC)
    pub fn new() -> Self {
        let config = ApuConfig::default();
        let volume = MasterVolume::new(config.volume);
        Self::from_parts(config, volume)
    }

    /// Create an APU from a validated configuration
    pub fn with_config(config: ApuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let volume = MasterVolume::new(config.volume);
        Ok(Self::from_parts(config, volume))
    }

    fn from_parts(config: ApuConfig, volume: MasterVolume) -> Self {
        Self {
            pulse1: PulseChannel::new(PulseId::One, config.harmonics_square),
            pulse2: PulseChannel::new(PulseId::Two, config.harmonics_square),
            triangle: TriangleChannel::new(config.harmonics_triangle),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(),
            frame_counter: FrameCounter::new(config.timing),
            clock_counter: 0,
            total_time: 0.0,
            volume,
            config,
            sample: 0.0,
        }
    }

    /// Process APU register writes
    pub fn write(&mut self, addr: u16, val: u8) {
        log(LogCategory::Registers, LogLevel::Trace, || {
            format!("APU write ${:04X} <- {:02X}", addr, val)
        });

        match addr {
            // Pulse 1 registers
            0x4000 => self.pulse1.write_control(val),
            0x4001 => self.pulse1.write_sweep(val),
            0x4002 => self.pulse1.write_timer_low(val),
            0x4003 => self.pulse1.write_timer_high(val),

            // Pulse 2 registers
            0x4004 => self.pulse2.write_control(val),
            0x4005 => self.pulse2.write_sweep(val),
            0x4006 => self.pulse2.write_timer_low(val),
            0x4007 => self.pulse2.write_timer_high(val),

            // Triangle registers
            0x4008 => self.triangle.write_linear(val),
            0x400A => self.triangle.write_timer_low(val),
            0x400B => self.triangle.write_timer_high(val),

            // Noise registers
            0x400C => self.noise.write_control(val),
            0x400E => self.noise.write_period(val, self.config.timing.noise_periods()),
            0x400F => {
                self.noise.write_length(val);
                // Restarts every envelope, not only the noise channel's
                self.pulse1.envelope.restart();
                self.pulse2.envelope.restart();
                self.noise.envelope.restart();
            }

            // DMC registers
            0x4010 => self.dmc.write_flags_rate(val, self.config.timing.dmc_rates()),
            0x4011 => self.dmc.write_direct_load(val),
            0x4012 => self.dmc.write_sample_address(val),
            0x4013 => self.dmc.write_sample_length(val),

            // APU Enable register
            0x4015 => {
                self.pulse1.set_enabled((val & 0x01) != 0);
                self.pulse2.set_enabled((val & 0x02) != 0);
                self.triangle.set_enabled((val & 0x04) != 0);
                self.noise.set_enabled((val & 0x08) != 0);
                self.dmc.set_enabled((val & 0x10) != 0);
            }

            // Frame Counter register
            0x4017 => self.frame_counter.write_control(val),

            _ => log(LogCategory::Stubs, LogLevel::Debug, || {
                format!("Unhandled APU write ${:04X} <- {:02X}", addr, val)
            }),
        }
    }

    /// Read APU status register ($4015). Other addresses read as 0.
    ///
    /// Reading the status acknowledges the frame IRQ.
    pub fn read(&self, addr: u16) -> u8 {
        if addr != 0x4015 {
            log(LogCategory::Stubs, LogLevel::Debug, || {
                format!("Unhandled APU read ${:04X}", addr)
            });
            return 0;
        }

        let mut status = 0u8;
        if self.pulse1.length_counter.is_active() {
            status |= 0x01;
        }
        if self.pulse2.length_counter.is_active() {
            status |= 0x02;
        }
        if self.triangle.length_counter.is_active() {
            status |= 0x04;
        }
        if self.noise.length_counter.is_active() {
            status |= 0x08;
        }
        if self.dmc.has_bytes_remaining() {
            status |= 0x10;
        }
        if self.frame_counter.take_irq() {
            status |= 0x40;
            log(LogCategory::Interrupts, LogLevel::Debug, || {
                "Frame IRQ acknowledged by $4015 read".to_string()
            });
        }
        if self.dmc.irq_pending {
            status |= 0x80;
        }

        log(LogCategory::Registers, LogLevel::Trace, || {
            format!("APU read $4015 -> {:02X}", status)
        });
        status
    }

    /// Advance one system tick. `sampling` selects the band-limited
    /// synthesis path and the per-cycle sweep tracking.
    pub fn clock(&mut self, sampling: bool) {
        self.total_time += 1.0 / (3.0 * self.config.timing.cpu_clock_hz());

        self.clock_counter += 1;
        if self.clock_counter % TICKS_PER_CPU_CYCLE == 0 {
            self.triangle.clock_timer();
        }
        if self.clock_counter == TICKS_PER_APU_CYCLE {
            self.clock_counter = 0;
            self.clock_apu_cycle(sampling);
        }
    }

    fn clock_apu_cycle(&mut self, sampling: bool) {
        let (quarter_frame, half_frame) = self.frame_counter.clock();

        if quarter_frame {
            self.pulse1.clock_quarter_frame();
            self.pulse2.clock_quarter_frame();
            self.triangle.clock_quarter_frame();
            self.noise.clock_quarter_frame();
        }
        if half_frame {
            self.pulse1.clock_half_frame();
            self.pulse2.clock_half_frame();
            self.triangle.clock_half_frame();
            self.noise.clock_half_frame();
        }

        self.pulse1.clock_timer();
        self.pulse2.clock_timer();
        self.noise.clock_timer();

        if let Some(addr) = self.dmc.clock() {
            log(LogCategory::Dmc, LogLevel::Trace, || {
                format!("DMC: byte requested at {:04X}", addr)
            });
        }

        if sampling {
            self.pulse1.track_sweep();
            self.pulse2.track_sweep();
        }

        self.update_sample(sampling);
    }

    fn update_sample(&mut self, sampling: bool) {
        if sampling && !self.config.raw_audio {
            let t = self.total_time;
            let cpu_hz = self.config.timing.cpu_clock_hz();
            self.pulse1.synthesize(t, cpu_hz);
            self.pulse2.synthesize(t, cpu_hz);
            self.triangle.synthesize(t, cpu_hz);
        } else {
            self.pulse1.sample_digital();
            self.pulse2.sample_digital();
            self.triangle.sample_digital();
        }
        self.noise.sample_digital();

        self.sample = mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.volume.get(),
        );
    }

    /// Mixed output sample from the most recent APU cycle
    pub fn get_sample(&self) -> f64 {
        self.sample
    }

    /// Return the IRQ line and acknowledge the frame IRQ.
    ///
    /// A pending DMC IRQ also asserts the line; it stays asserted until a
    /// `$4015` write or a `$4010` write that disables it.
    pub fn irq(&mut self) -> bool {
        let frame = self.frame_counter.take_irq();
        if frame {
            log(LogCategory::Interrupts, LogLevel::Debug, || {
                "Frame IRQ delivered".to_string()
            });
        }
        frame || self.dmc.irq_pending
    }

    /// Restore power-on state. Configuration and the master volume survive.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        let volume = self.volume.clone();
        *self = Self::from_parts(config, volume);
        log(LogCategory::Registers, LogLevel::Info, || "APU reset".to_string());
    }

    /// Power-on initialization; identical to [`Rp2a03Apu::reset`]
    pub fn startup(&mut self) {
        self.reset();
    }

    /// Set the master volume, clamped to `0.0..=1.0`
    pub fn set_volume(&mut self, volume: f64) {
        self.volume.set(volume);
        log(LogCategory::Synthesis, LogLevel::Info, || {
            format!("Master volume set to {:.3}", self.volume.get())
        });
    }

    pub fn volume(&self) -> f64 {
        self.volume.get()
    }

    /// Handle for adjusting the master volume from another thread
    pub fn volume_handle(&self) -> MasterVolume {
        self.volume.clone()
    }

    /// Mix raw digital levels instead of the band-limited oscillators
    pub fn enable_raw_audio(&mut self, raw: bool) {
        self.config.raw_audio = raw;
        log(LogCategory::Synthesis, LogLevel::Info, || {
            format!("Raw audio {}", if raw { "enabled" } else { "disabled" })
        });
    }

    /// Change the oscillator harmonic counts
    pub fn set_harmonics(&mut self, square: u32, triangle: u32) -> Result<(), ConfigError> {
        let config = ApuConfig {
            harmonics_square: square,
            harmonics_triangle: triangle,
            ..self.config.clone()
        };
        config.validate()?;
        self.pulse1.oscillator.set_harmonics(square);
        self.pulse2.oscillator.set_harmonics(square);
        self.triangle.oscillator.set_harmonics(triangle);
        self.config = config;
        log(LogCategory::Synthesis, LogLevel::Info, || {
            format!("Harmonics set to square={} triangle={}", square, triangle)
        });
        Ok(())
    }

    /// Current configuration, including the live master volume
    pub fn config(&self) -> ApuConfig {
        ApuConfig {
            volume: self.volume.get(),
            ..self.config.clone()
        }
    }

    /// Emulated time in seconds since power-on
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn frame_counter(&self) -> &FrameCounter {
        &self.frame_counter
    }

    /// Address the DMC is waiting on, if it has requested a byte
    pub fn dmc_request(&self) -> Option<u16> {
        self.dmc.pending_fetch()
    }

    /// Satisfy an outstanding DMC byte request from the system bus.
    /// Returns false if the DMC was not waiting on a byte.
    pub fn service_dmc<B: CpuBus + ?Sized>(&mut self, bus: &B) -> bool {
        self.dmc.service(bus)
    }
}

impl AudioChip for Rp2a03Apu {
    fn write_register(&mut self, addr: u16, val: u8) {
        self.write(addr, val);
    }

    fn read_register(&self, addr: u16) -> u8 {
        self.read(addr)
    }

    fn clock(&mut self, sampling: bool) {
        Rp2a03Apu::clock(self, sampling);
    }

    fn sample(&self) -> f64 {
        self.sample
    }

    fn irq(&mut self) -> bool {
        Rp2a03Apu::irq(self)
    }

    fn reset(&mut self) {
        Rp2a03Apu::reset(self);
    }

    fn timing(&self) -> TimingMode {
        self.config.timing
    }
}

impl Default for Rp2a03Apu {
    fn default() -> Self {
        Self::new()
    }
}
