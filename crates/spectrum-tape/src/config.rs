//! Codec configuration.

use serde::{Deserialize, Serialize};

use crate::error::TapeError;
use crate::timing::{
    CPU_CLOCK_HZ, MIN_PILOT_PULSE_COUNT, PulseTimings, SAVE_PULSE_TOLERANCE, SAVE_STOP_SILENCE,
};

/// 48K ROM entry point of LD-BYTES.
pub const ROM_LOAD_ADDRESS: u16 = 0x056C;

/// 48K ROM entry point of SA-BYTES.
pub const ROM_SAVE_ADDRESS: u16 = 0x04C2;

/// RST 08 error restart; the ROM ends a failed LOAD or a BREAK here.
pub const ROM_ERROR_ADDRESS: u16 = 0x0008;

/// Settings for playback, capture and mode detection.
///
/// Every field has a default matching the 48K ROM, so a JSON file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapeConfig {
    /// CPU clock the tact counter runs at.
    pub clock_hz: u32,
    /// Allowed deviation of a captured pulse, in tacts.
    pub pulse_tolerance: u16,
    /// Pilot pulses needed before a sync pulse is accepted.
    pub min_pilot_pulses: u32,
    /// MIC silence, in tacts, that ends SAVE mode.
    pub silence_threshold: u64,
    pub load_address: u16,
    pub save_address: u16,
    pub error_address: u16,
    /// Pause written after each captured block.
    pub default_pause_ms: u16,
}

impl Default for TapeConfig {
    fn default() -> Self {
        Self {
            clock_hz: CPU_CLOCK_HZ,
            pulse_tolerance: SAVE_PULSE_TOLERANCE,
            min_pilot_pulses: MIN_PILOT_PULSE_COUNT,
            silence_threshold: SAVE_STOP_SILENCE,
            load_address: ROM_LOAD_ADDRESS,
            save_address: ROM_SAVE_ADDRESS,
            error_address: ROM_ERROR_ADDRESS,
            default_pause_ms: 1000,
        }
    }
}

impl TapeConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, TapeError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can decode a ROM recording: every pulse
    /// length must have a tolerance window of its own.
    pub fn validate(&self) -> Result<(), TapeError> {
        let max = PulseTimings::STANDARD.max_tolerance();
        if self.pulse_tolerance > max {
            return Err(TapeError::ToleranceTooWide {
                tolerance: self.pulse_tolerance,
                max,
            });
        }
        Ok(())
    }

    /// Tacts per millisecond at the configured clock.
    #[must_use]
    pub fn tacts_per_ms(&self) -> u32 {
        self.clock_hz / 1000
    }
}
