//! Thread-shared APU handle.
//!
//! An audio thread and the CPU thread can both hold a [`SharedApu`]. Every
//! operation takes the lock once, so a batch of ticks runs under a single
//! exclusive borrow and samples are only observed between completed ticks.
//! The master volume bypasses the lock entirely.

use std::sync::{Arc, Mutex, MutexGuard};

use super::memory_reader::CpuBus;
use super::mixer::MasterVolume;
use super::rp2a03::Rp2a03Apu;

#[derive(Debug, Clone)]
pub struct SharedApu {
    inner: Arc<Mutex<Rp2a03Apu>>,
    volume: MasterVolume,
}

impl SharedApu {
    pub fn new(apu: Rp2a03Apu) -> Self {
        let volume = apu.volume_handle();
        Self {
            inner: Arc::new(Mutex::new(apu)),
            volume,
        }
    }

    /// A panic while holding the lock leaves the APU between ticks, so a
    /// poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Rp2a03Apu> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `ticks` system ticks and return the mixed sample after the last one
    pub fn run(&self, ticks: usize, sampling: bool) -> f64 {
        let mut apu = self.lock();
        for _ in 0..ticks {
            apu.clock(sampling);
        }
        apu.get_sample()
    }

    pub fn write(&self, addr: u16, val: u8) {
        self.lock().write(addr, val);
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.lock().read(addr)
    }

    pub fn irq(&self) -> bool {
        self.lock().irq()
    }

    pub fn sample(&self) -> f64 {
        self.lock().get_sample()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn service_dmc<B: CpuBus + ?Sized>(&self, bus: &B) -> bool {
        self.lock().service_dmc(bus)
    }

    /// Run `f` with exclusive access to the APU
    pub fn with<R>(&self, f: impl FnOnce(&mut Rp2a03Apu) -> R) -> R {
        f(&mut self.lock())
    }

    /// Lock-free master volume handle
    pub fn volume(&self) -> MasterVolume {
        self.volume.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn run_steps_under_one_lock() {
        let shared = SharedApu::new(Rp2a03Apu::new());
        shared.write(0x4015, 0x01);
        shared.write(0x4003, 0x08);
        shared.run(6 * 14916, false);
        assert!(shared.irq());
        assert_eq!(shared.read(0x4015) & 0x01, 0x01);
    }

    #[test]
    fn audio_thread_and_cpu_thread_share_state() {
        let shared = SharedApu::new(Rp2a03Apu::new());
        let audio = shared.clone();

        let worker = thread::spawn(move || {
            let mut last = 0.0;
            for _ in 0..100 {
                last = audio.run(60, true);
            }
            last
        });
        for _ in 0..100 {
            shared.write(0x4000, 0xBF);
        }
        let last = worker.join().expect("audio thread");
        assert!((-1.0..=1.0).contains(&last));
        assert!(shared.with(|apu| apu.total_time()) > 0.0);
    }

    #[test]
    fn volume_changes_without_lock() {
        let shared = SharedApu::new(Rp2a03Apu::new());
        let guard = shared.inner.lock().expect("lock");
        shared.volume().set(0.9);
        drop(guard);
        assert_eq!(shared.with(|apu| apu.volume()), 0.9);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let shared = SharedApu::new(Rp2a03Apu::new());
        let victim = shared.clone();
        let result = thread::spawn(move || {
            let _: () = victim.with(|_| panic!("audio callback failed"));
        })
        .join();
        assert!(result.is_err());

        shared.write(0x4015, 0x04);
        shared.write(0x400B, 0x08);
        assert_eq!(shared.read(0x4015), 0x04);
    }
}
