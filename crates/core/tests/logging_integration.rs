//! Integration test for APU logging to a file
//!
//! Runs in its own test binary so the global log configuration is not shared
//! with the unit tests.

use std::time::{Duration, Instant};

use nes_apu::logging::{LogCategory, LogConfig, LogLevel};
use nes_apu::Rp2a03Apu;

fn wait_for(path: &std::path::Path, needle: &str) -> String {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        if contents.contains(needle) || Instant::now() > deadline {
            return contents;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_logging_frame_irq_and_stub_writes() {
    let path = std::env::temp_dir().join(format!("nes_apu_log_{}.txt", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let config = LogConfig::global();
    config.set_log_file(path.clone()).expect("open log file");
    config.set_level(LogCategory::Interrupts, LogLevel::Debug);
    config.set_level(LogCategory::Stubs, LogLevel::Debug);

    let mut apu = Rp2a03Apu::new();
    apu.write(0x4009, 0x00); // unused register
    for _ in 0..(6 * 14916) {
        apu.clock(false);
    }
    assert!(apu.irq());

    let contents = wait_for(&path, "Frame IRQ raised");
    config.clear_log_file();
    config.reset();
    let _ = std::fs::remove_file(&path);

    assert!(contents.contains("Unhandled APU write $4009"));
    assert!(contents.contains("Frame IRQ raised"));
}
