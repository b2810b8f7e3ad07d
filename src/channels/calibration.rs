//! Raw-count to engineering-unit conversions.
//!
//! A channel holds one [`Calibration`] value, chosen when it is configured.
//! Linear sensors carry slope and intercept; non-linear ones carry a plain
//! conversion function. [`Sensor`] names the probe plugged into a BTA
//! connector and picks the calibration for each of its two ranges.

use serde::{Deserialize, Serialize};

/// Fixed divider resistor on the BTA thermistor input, ohms.
const THERMISTOR_DIVIDER_OHMS: f32 = 15_000.0;

// Steinhart–Hart coefficients for the stainless-steel temperature probe.
const SH_A: f32 = 0.001_021_19;
const SH_B: f32 = 0.000_222_468;
const SH_C: f32 = 1.333_42e-7;

const KELVIN_OFFSET: f32 = 273.15;

#[derive(Debug, Clone, Copy)]
pub enum Calibration {
    Linear {
        slope: f32,
        intercept: f32,
        units: &'static str,
    },
    Curve {
        convert: fn(u16) -> f32,
        units: &'static str,
    },
}

impl Calibration {
    /// Identity; reports the ADC count.
    pub const RAW: Self = Self::Linear {
        slope: 1.0,
        intercept: 0.0,
        units: "raw",
    };

    /// ±10 V input divider.
    pub const VOLTAGE_10V: Self = Self::Linear {
        slope: 20.0 / 1024.0,
        intercept: -10.0,
        units: "V",
    };

    /// ±5 V input divider.
    pub const VOLTAGE_5V: Self = Self::Linear {
        slope: 10.0 / 1024.0,
        intercept: -5.0,
        units: "V",
    };

    /// Single-axis accelerometer.
    pub const ACCEL_1D: Self = Self::Linear {
        slope: -0.1134,
        intercept: 50.978,
        units: "m/s²",
    };

    /// Thermistor probe behind the 15 kΩ divider.
    pub const THERMISTOR: Self = Self::Curve {
        convert: thermistor_celsius,
        units: "°C",
    };

    pub fn apply(&self, raw: u16) -> f32 {
        match *self {
            Self::Linear {
                slope, intercept, ..
            } => slope * f32::from(raw) + intercept,
            Self::Curve { convert, .. } => convert(raw),
        }
    }

    pub fn units(&self) -> &'static str {
        match *self {
            Self::Linear { units, .. } | Self::Curve { units, .. } => units,
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::RAW
    }
}

/// Probe attached to a BTA connector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    /// Plain voltage probe; the range sets the divider.
    #[default]
    Voltage,
    /// Unconverted ADC counts.
    Raw,
    /// Single-axis accelerometer.
    #[serde(rename = "accel_1d")]
    Accel1D,
    /// Stainless-steel temperature probe.
    Thermistor,
}

impl Sensor {
    /// Name, short name and calibration for one range of the connector.
    pub fn describe(self, ten_volt: bool) -> (&'static str, &'static str, Calibration) {
        match (self, ten_volt) {
            (Self::Voltage, false) => ("Voltage +/- 5V", "V5", Calibration::VOLTAGE_5V),
            (Self::Voltage, true) => ("Voltage +/- 10V", "V10", Calibration::VOLTAGE_10V),
            (Self::Raw, _) => ("Gen Analog", "GA", Calibration::RAW),
            (Self::Accel1D, _) => ("1D Accelerometer", "ACC", Calibration::ACCEL_1D),
            (Self::Thermistor, _) => ("Temperature", "TMP", Calibration::THERMISTOR),
        }
    }
}

/// Steinhart–Hart conversion. Rails (0 or full scale) have no finite answer.
fn thermistor_celsius(raw: u16) -> f32 {
    if raw == 0 || raw >= 1024 {
        return f32::NAN;
    }
    let count = f32::from(raw);
    let resistance = THERMISTOR_DIVIDER_OHMS * count / (1024.0 - count);
    let ln_r = resistance.ln();
    let kelvin = 1.0 / (SH_A + SH_B * ln_r + SH_C * ln_r * ln_r * ln_r);
    kelvin - KELVIN_OFFSET
}
