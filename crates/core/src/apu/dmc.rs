//! Delta Modulation Channel (DMC) for NES APU.
//!
//! Only the register file and the sample fetch pacing are modelled. The
//! channel requests bytes from CPU memory at its programmed rate, raises its
//! IRQ when a sample finishes and restarts looped samples, but it never
//! drives the output DAC: its contribution to the mix is silence.
//!
//! ## Register Interface
//!
//! - **$4010**: Flags and rate (IRQ enable, loop, rate index)
//! - **$4011**: Direct load (7-bit output level)
//! - **$4012**: Sample address ($C000 + address * 64)
//! - **$4013**: Sample length (length * 16 + 1 bytes)

use super::memory_reader::{CpuBus, MemoryReader};
use crate::logging::{log, LogCategory, LogLevel};

/// NES DMC (Delta Modulation Channel).
#[derive(Debug, Clone)]
pub struct DmcChannel {
    /// IRQ enable flag
    pub irq_enabled: bool,
    /// Loop flag - restart sample when complete
    pub loop_enabled: bool,
    /// Sample rate index (0-15)
    pub rate_index: u8,
    /// Last direct load value (7-bit, 0-127)
    pub output_level: u8,
    /// Sample address ($C000 + address * 64)
    pub sample_address: u16,
    /// Sample length in bytes (length * 16 + 1)
    pub sample_length: u16,
    pub irq_pending: bool,
    pub enabled: bool,

    reader: MemoryReader,
    /// Most recently fetched sample byte
    sample_buffer: Option<u8>,
    bits_remaining: u8,
    timer: u16,
    /// Timer period in APU cycles
    timer_period: u16,
    /// A byte request is waiting for the host to service it
    fetch_pending: bool,
}

impl DmcChannel {
    pub fn new() -> Self {
        Self {
            irq_enabled: false,
            loop_enabled: false,
            rate_index: 0,
            output_level: 0,
            sample_address: 0xC000,
            sample_length: 1,
            irq_pending: false,
            enabled: false,
            reader: MemoryReader::new(),
            sample_buffer: None,
            bits_remaining: 0,
            timer: 0,
            timer_period: 0,
            fetch_pending: false,
        }
    }

    /// Write to $4010 - flags and rate. `rates` is the region's table in CPU cycles.
    pub fn write_flags_rate(&mut self, val: u8, rates: &[u16; 16]) {
        self.irq_enabled = (val & 0x80) != 0;
        self.loop_enabled = (val & 0x40) != 0;
        self.rate_index = val & 0x0F;
        self.timer_period = rates[self.rate_index as usize] / 2 - 1;

        if !self.irq_enabled {
            self.irq_pending = false;
        }
    }

    /// Write to $4011 - direct load
    pub fn write_direct_load(&mut self, val: u8) {
        self.output_level = val & 0x7F;
    }

    /// Write to $4012 - sample address
    pub fn write_sample_address(&mut self, val: u8) {
        self.sample_address = 0xC000 + (val as u16) * 64;
    }

    /// Write to $4013 - sample length
    pub fn write_sample_length(&mut self, val: u8) {
        self.sample_length = (val as u16) * 16 + 1;
    }

    /// Bit 4 of `$4015`. Enabling starts the sample if none is playing;
    /// disabling stops it. Either way the DMC IRQ is acknowledged.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.irq_pending = false;
        if enabled {
            if !self.reader.is_active() {
                self.reader.start(self.sample_address, self.sample_length);
            }
        } else {
            self.reader.stop();
            self.fetch_pending = false;
        }
    }

    pub fn has_bytes_remaining(&self) -> bool {
        self.reader.is_active()
    }

    pub fn bytes_remaining(&self) -> u16 {
        self.reader.bytes_remaining
    }

    /// Clock one APU cycle.
    /// Returns the address to read from when a new byte is needed.
    pub fn clock(&mut self) -> Option<u16> {
        if !self.enabled {
            return None;
        }

        if self.timer > 0 {
            self.timer -= 1;
            return None;
        }
        self.timer = self.timer_period;

        // One bit of the buffer is consumed per timer expiry
        if self.bits_remaining > 0 {
            self.bits_remaining -= 1;
            if let Some(byte) = self.sample_buffer.as_mut() {
                *byte >>= 1;
            }
        }

        if self.bits_remaining == 0 && !self.fetch_pending && self.reader.is_active() {
            self.fetch_pending = true;
            return Some(self.reader.current_address);
        }

        None
    }

    /// Address of the outstanding byte request, if any
    pub fn pending_fetch(&self) -> Option<u16> {
        if self.fetch_pending {
            Some(self.reader.current_address)
        } else {
            None
        }
    }

    /// Satisfy an outstanding byte request from `bus`.
    /// Returns false if nothing was pending.
    pub fn service<B: CpuBus + ?Sized>(&mut self, bus: &B) -> bool {
        if !self.fetch_pending {
            return false;
        }
        self.fetch_pending = false;

        if let Some(byte) = self.reader.fetch(bus) {
            self.sample_buffer = Some(byte);
            self.bits_remaining = 8;
        }

        if !self.reader.is_active() {
            if self.loop_enabled {
                self.reader.start(self.sample_address, self.sample_length);
            } else if self.irq_enabled {
                self.irq_pending = true;
                log(LogCategory::Interrupts, LogLevel::Debug, || {
                    "DMC: sample complete, IRQ raised".to_string()
                });
            }
        }
        true
    }

    /// The DMC contributes nothing to the mix.
    pub fn output(&self) -> f64 {
        0.0
    }
}

impl Default for DmcChannel {
    fn default() -> Self {
        Self::new()
    }
}
