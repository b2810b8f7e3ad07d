//! System configuration parameters
//!
//! Tunable parameters for the LabShield firmware.  Defaults reproduce the
//! behaviour host software expects from a freshly booted shield.

use serde::{Deserialize, Serialize};

use crate::channels::analog::SampleRate;
use crate::channels::calibration::Sensor;
use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConfig {
    // --- Identity ---
    /// Firmware major revision reported by `ST_VERS`.
    pub version_major: u8,
    /// Firmware minor revision reported by `ST_VERS`.
    pub version_minor: u8,
    /// Banner written once at start-up, before the version.
    pub boot_banner: heapless::String<16>,

    // --- Analog defaults ---
    /// Sample-rate code applied to every analog channel at boot.
    pub default_sample_rate: u8,
    /// Readings per run before an analog channel halts itself (0 = unbounded).
    pub default_stop_count: u16,
    /// Probe on BTA connector 1 (both ranges).
    #[serde(default)]
    pub bta01_sensor: Sensor,
    /// Probe on BTA connector 2 (both ranges).
    #[serde(default)]
    pub bta02_sensor: Sensor,

    // --- Button / LED ---
    /// Minimum hold time (milliseconds) for a button press to count.
    pub button_debounce_ms: u32,
    /// LED blink period (milliseconds) used until `BLINKLED` sets one.
    pub led_blink_period_ms: u32,

    // --- Scheduling ---
    /// Upper bound on inbound bytes consumed per tick.
    pub max_rx_bytes_per_tick: usize,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        let mut boot_banner = heapless::String::new();
        let _ = boot_banner.push_str("*HELLO*");

        Self {
            version_major: 1,
            version_minor: 3,
            boot_banner,

            default_sample_rate: SampleRate::Hz10 as u8,
            default_stop_count: 100,
            bta01_sensor: Sensor::Voltage,
            bta02_sensor: Sensor::Voltage,

            button_debounce_ms: 20,
            led_blink_period_ms: 200,

            max_rx_bytes_per_tick: 64,
        }
    }
}

impl ShieldConfig {
    /// Reject values the firmware cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if SampleRate::from_code(self.default_sample_rate).is_none() {
            return Err(ConfigError::ValidationFailed("default_sample_rate"));
        }
        if self.default_stop_count > 0x3FFF {
            return Err(ConfigError::ValidationFailed("default_stop_count"));
        }
        if self.max_rx_bytes_per_tick == 0 {
            return Err(ConfigError::ValidationFailed("max_rx_bytes_per_tick"));
        }
        if self.led_blink_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("led_blink_period_ms"));
        }
        Ok(())
    }

    /// Parse a JSON configuration document and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Version string in the form the host expects (`1.03`).
    pub fn version(&self) -> heapless::String<8> {
        use core::fmt::Write;
        let mut s = heapless::String::new();
        let _ = write!(s, "{}.{:02}", self.version_major, self.version_minor);
        s
    }
}
