//! Centralized logging for the APU core.
//!
//! # Architecture
//!
//! - **LogConfig**: Thread-safe global configuration using atomic operations
//! - **LogLevel**: Hierarchical log levels (Off < Error < Warn < Info < Debug < Trace)
//! - **LogCategory**: APU subsystems (register decode, frame counter, interrupts,
//!   DMC reader, synthesis, unimplemented registers)
//! - **log()**: Common logging function for all output
//!
//! # Performance
//!
//! `Rp2a03Apu::clock` runs millions of times per emulated second, so logging
//! must stay out of its way:
//! - The message closure is only evaluated when the category is enabled
//! - A per-category rate limiter drops floods (default 60 messages/second)
//! - File output is handed to a background thread over a channel
//!
//! # Usage
//!
//! ```rust
//! use nes_apu::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Registers, LogLevel::Trace, || {
//!     format!("APU: write {:04X} <- {:02X}", 0x4015, 0x0F)
//! });
//! ```

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for the APU subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LogCategory {
    /// Register reads and writes ($4000-$4017)
    Registers = 0,
    /// Frame counter mode changes and delayed resets
    FrameCounter = 1,
    /// Frame and DMC interrupts
    Interrupts = 2,
    /// DMC memory reader fetches
    Dmc = 3,
    /// Oscillator/mixer configuration
    Synthesis = 4,
    /// Unmapped or unimplemented registers
    Stubs = 5,
}

const CATEGORY_COUNT: usize = 6;

impl LogCategory {
    fn index(self) -> usize {
        self as usize
    }
}

/// Per-category sliding-window rate limiter
struct RateLimiter {
    max_logs_per_second: AtomicUsize,
    window_duration: Duration,
    state: Mutex<RateState>,
}

#[derive(Default)]
struct RateState {
    timestamps: [VecDeque<Instant>; CATEGORY_COUNT],
    dropped: [usize; CATEGORY_COUNT],
    last_drop_report: [Option<Instant>; CATEGORY_COUNT],
}

impl RateLimiter {
    fn new(max_logs_per_second: usize) -> Self {
        Self {
            max_logs_per_second: AtomicUsize::new(max_logs_per_second),
            window_duration: Duration::from_secs(1),
            state: Mutex::new(RateState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns (allowed, dropped_count) where dropped_count is Some(n) when
    /// a summary of dropped messages is due
    fn should_allow(&self, category: LogCategory) -> (bool, Option<usize>) {
        let now = Instant::now();
        let idx = category.index();
        let mut state = self.lock();
        let state = &mut *state;

        let window = &mut state.timestamps[idx];
        while let Some(&front) = window.front() {
            if now.duration_since(front) > self.window_duration {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() < self.max_logs_per_second.load(Ordering::Relaxed) {
            window.push_back(now);
            let dropped = std::mem::take(&mut state.dropped[idx]);
            if dropped > 0 {
                state.last_drop_report[idx] = Some(now);
                return (true, Some(dropped));
            }
            return (true, None);
        }

        state.dropped[idx] += 1;
        let report_due = state.last_drop_report[idx]
            .map_or(true, |last| now.duration_since(last) >= Duration::from_secs(1));
        if report_due {
            state.last_drop_report[idx] = Some(now);
            (false, Some(std::mem::take(&mut state.dropped[idx])))
        } else {
            (false, None)
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    global_level: AtomicU8,
    category_levels: [AtomicU8; CATEGORY_COUNT],
    log_sender: Mutex<Option<Sender<String>>>,
    file_logging_enabled: AtomicBool,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    /// Create a LogConfig with all logging disabled and the default rate limit
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            category_levels: std::array::from_fn(|_| AtomicU8::new(LogLevel::Off as u8)),
            log_sender: Mutex::new(None),
            file_logging_enabled: AtomicBool::new(false),
            rate_limiter: RateLimiter::new(60),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.category_levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category with its own level uses it; otherwise the global level applies.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        match self.get_level(category) {
            LogLevel::Off => level <= self.get_global_level(),
            category_level => level <= category_level,
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for level in &self.category_levels {
            level.store(LogLevel::Off as u8, Ordering::Relaxed);
        }
    }

    /// Set the maximum logs per second per category
    pub fn set_rate_limit(&self, max_logs_per_second: usize) {
        self.rate_limiter
            .max_logs_per_second
            .store(max_logs_per_second, Ordering::Relaxed);
    }

    pub fn get_rate_limit(&self) -> usize {
        self.rate_limiter.max_logs_per_second.load(Ordering::Relaxed)
    }

    /// Send log output to a file, written from a background thread.
    ///
    /// Replaces any previous log file.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("apu-log-writer".to_string())
            .spawn(move || {
                while let Ok(message) = receiver.recv() {
                    let _ = writeln!(file, "{}", message);
                    let _ = file.flush();
                }
            })?;

        *self.sender() = Some(sender);
        self.file_logging_enabled.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stop logging to file; the writer thread exits when its sender drops
    pub fn clear_log_file(&self) {
        *self.sender() = None;
        self.file_logging_enabled.store(false, Ordering::Relaxed);
    }

    fn sender(&self) -> MutexGuard<'_, Option<Sender<String>>> {
        self.log_sender.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_message(&self, message: String) {
        if self.file_logging_enabled.load(Ordering::Relaxed) {
            if let Some(sender) = self.sender().as_ref() {
                if let Err(failed) = sender.send(message) {
                    eprintln!("{}", failed.0);
                }
                return;
            }
        }
        eprintln!("{}", message);
    }
}

/// Log a message with the specified category and level.
///
/// The closure only runs when the category is enabled at `level` and the
/// rate limiter admits the message.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let (allowed, dropped) = config.rate_limiter.should_allow(category);
    if let Some(count) = dropped.filter(|&n| n > 0) {
        config.write_message(format!(
            "[{:?}] WARNING: Rate limit exceeded, {} log message(s) dropped in the last second",
            category, count
        ));
    }
    if allowed {
        config.write_message(message_fn());
    }
}
