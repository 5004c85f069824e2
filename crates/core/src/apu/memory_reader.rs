//! Sample memory reader for the delta modulation channel.
//!
//! The reader walks a block of CPU address space one byte at a time. It does
//! not own memory: each fetch borrows the system bus through [`CpuBus`] for
//! the duration of a single read.

use crate::logging::{log, LogCategory, LogLevel};

/// Read access to the CPU address space, implemented by the host's system bus.
///
/// Reads are synchronous and must return immediately; arbitration and
/// open-bus behaviour belong to the bus.
pub trait CpuBus {
    /// Read a byte. `read_only` asks the bus to suppress read side effects.
    fn cpu_read(&self, addr: u16, read_only: bool) -> u8;
}

/// Byte-at-a-time reader over a sample block.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    /// Address of the next byte to fetch
    pub current_address: u16,
    /// Bytes left in the current sample
    pub bytes_remaining: u16,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin reading `length` bytes starting at `address`
    pub fn start(&mut self, address: u16, length: u16) {
        self.current_address = address;
        self.bytes_remaining = length;
    }

    pub fn stop(&mut self) {
        self.bytes_remaining = 0;
    }

    pub fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Fetch the next byte, advancing the address and decrementing the
    /// remaining count. Returns `None` once the sample is exhausted.
    pub fn fetch<B: CpuBus + ?Sized>(&mut self, bus: &B) -> Option<u8> {
        if self.bytes_remaining == 0 {
            return None;
        }

        let addr = self.current_address;
        let byte = bus.cpu_read(addr, false);
        self.current_address = next_address(addr);
        self.bytes_remaining -= 1;

        log(LogCategory::Dmc, LogLevel::Trace, || {
            format!(
                "DMC: fetched {:02X} from {:04X}, {} byte(s) left",
                byte, addr, self.bytes_remaining
            )
        });

        Some(byte)
    }
}

/// Address following `addr`, folded into the `$8000-$8FFF` window.
pub fn next_address(addr: u16) -> u16 {
    (addr.wrapping_add(1) & 0x0FFF) | 0x8000
}
