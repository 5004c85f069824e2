//! APU configuration.
//!
//! Everything the host can tune about synthesis lives here and is handed to
//! the APU at construction; nothing is process-global.

use crate::apu::oscillator::{DEFAULT_SQUARE_HARMONICS, DEFAULT_TRIANGLE_HARMONICS};
use crate::apu::TimingMode;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("volume {0} is outside 0.0..=1.0")]
    InvalidVolume(f64),
    #[error("{channel} harmonic count must be at least 1, got {value}")]
    InvalidHarmonics { channel: &'static str, value: u32 },
    #[error("invalid APU config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApuConfig {
    /// Master volume (0.0-1.0); the mix is scaled by twice this value
    pub volume: f64,
    /// Harmonics summed by the pulse channel oscillators
    pub harmonics_square: u32,
    /// Harmonics summed by the triangle channel oscillator
    pub harmonics_triangle: u32,
    /// Mix the raw digital channel levels instead of the band-limited oscillators
    pub raw_audio: bool,
    pub timing: TimingMode,
}

impl Default for ApuConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            harmonics_square: DEFAULT_SQUARE_HARMONICS,
            harmonics_triangle: DEFAULT_TRIANGLE_HARMONICS,
            raw_audio: false,
            timing: TimingMode::Ntsc,
        }
    }
}

impl ApuConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::InvalidVolume(self.volume));
        }
        if self.harmonics_square == 0 {
            return Err(ConfigError::InvalidHarmonics {
                channel: "square",
                value: self.harmonics_square,
            });
        }
        if self.harmonics_triangle == 0 {
            return Err(ConfigError::InvalidHarmonics {
                channel: "triangle",
                value: self.harmonics_triangle,
            });
        }
        Ok(())
    }
}
