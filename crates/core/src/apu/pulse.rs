//! Pulse wave channel.
//!
//! Two of these live in the APU (`$4000-$4003` and `$4004-$4007`). Each
//! composes an envelope, a length counter, a sweep unit and a duty
//! sequencer, plus an oscillator used when band-limited sampling is on.

use super::envelope::Envelope;
use super::length_counter::LengthCounter;
use super::oscillator::Oscillator;
use super::sequencer::{DutyCycle, PulseSequencer};
use super::sweep::{PulseId, Sweep};

/// Pulse channel that generates square wave samples.
///
/// Supports:
/// - 4 duty cycle modes (12.5%, 25%, 50%, 75%)
/// - 11-bit timer for frequency control
/// - Sweep unit for automatic pitch bends
/// - Length counter for note duration
/// - Envelope generator for volume control
#[derive(Debug, Clone)]
pub struct PulseChannel {
    id: PulseId,
    /// Set through `$4015`
    pub enabled: bool,
    /// Length counter halt / envelope loop flag
    pub halted: bool,
    pub envelope: Envelope,
    pub length_counter: LengthCounter,
    pub sweep: Sweep,
    pub sequencer: PulseSequencer,
    pub oscillator: Oscillator,
    /// Current sample (0.0-1.0)
    output: f64,
}

impl PulseChannel {
    pub fn new(id: PulseId, harmonics: u32) -> Self {
        let sequencer = PulseSequencer::new();
        let mut oscillator = Oscillator::new(harmonics);
        oscillator.duty_cycle = 1.0 - sequencer.duty.fraction();
        Self {
            id,
            enabled: false,
            halted: false,
            envelope: Envelope::new(),
            length_counter: LengthCounter::new(),
            sweep: Sweep::new(),
            sequencer,
            oscillator,
            output: 0.0,
        }
    }

    /// `$4000`/`$4004`: `DDLC VVVV`
    pub fn write_control(&mut self, val: u8) {
        let duty = DutyCycle::from_bits(val >> 6);
        self.sequencer.duty = duty;
        self.oscillator.duty_cycle = 1.0 - duty.fraction();
        self.halted = (val & 0x20) != 0;
        self.envelope.write(val);
    }

    /// `$4001`/`$4005`: `EPPP NSSS`
    pub fn write_sweep(&mut self, val: u8) {
        self.sweep.write(val);
        self.sweep.track(self.sequencer.reload);
    }

    /// `$4002`/`$4006`: timer low byte
    pub fn write_timer_low(&mut self, val: u8) {
        self.sequencer.set_reload_low(val);
        self.sweep.track(self.sequencer.reload);
    }

    /// `$4003`/`$4007`: length index and timer high bits. Restarts the
    /// envelope and the duty sequence.
    pub fn write_timer_high(&mut self, val: u8) {
        self.sequencer.set_reload_high(val);
        self.sequencer.restart();
        if self.enabled {
            self.length_counter.load(val);
        }
        self.envelope.restart();
        self.sweep.track(self.sequencer.reload);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.length_counter.counter = 0;
        }
    }

    /// Quarter frame: envelope
    pub fn clock_quarter_frame(&mut self) {
        self.envelope.clock(self.halted);
    }

    /// Half frame: length counter and sweep
    pub fn clock_half_frame(&mut self) {
        self.length_counter.clock(self.enabled, self.halted);
        self.sweep.clock(&mut self.sequencer.reload, self.id);
    }

    /// One APU cycle of the duty sequencer
    pub fn clock_timer(&mut self) {
        self.sequencer.clock(self.enabled);
    }

    pub fn track_sweep(&mut self) {
        self.sweep.track(self.sequencer.reload);
    }

    /// Channel is producing sound (before the duty pattern is applied)
    pub fn is_audible(&self) -> bool {
        self.enabled && self.length_counter.is_active() && !self.sweep.muted
    }

    /// Raw 4-bit DAC level
    pub fn digital_output(&self) -> u8 {
        if self.is_audible() && self.sequencer.output == 1 {
            self.envelope.output()
        } else {
            0
        }
    }

    /// Refresh `output` from the band-limited oscillator at time `t`.
    ///
    /// Each duty step lasts `reload + 2` APU cycles (two CPU cycles each).
    pub fn synthesize(&mut self, t: f64, cpu_hz: f64) {
        self.oscillator.frequency = cpu_hz / (16.0 * (self.sequencer.reload as f64 + 2.0));
        self.oscillator.amplitude = self.envelope.output() as f64 / 15.0;
        self.output = if self.is_audible() {
            self.oscillator.square_sample(t)
        } else {
            0.0
        };
    }

    /// Refresh `output` from the digital level
    pub fn sample_digital(&mut self) {
        self.output = self.digital_output() as f64 / 15.0;
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}
