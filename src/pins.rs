//! GPIO / ADC pin assignments for the LabShield carrier board (ESP32-S3).
//!
//! Single source of truth: channels and adapters reference this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Analog inputs (ADC1, GPIO n → ADC1 channel n-1)
// ---------------------------------------------------------------------------

/// BTA connector 1, ±5 V divider.
pub const BTA01_5V_GPIO: u8 = 7;
/// BTA connector 1, ±10 V divider.
pub const BTA01_10V_GPIO: u8 = 8;
/// BTA connector 2, ±5 V divider.
pub const BTA02_5V_GPIO: u8 = 9;
/// BTA connector 2, ±10 V divider.
pub const BTA02_10V_GPIO: u8 = 10;

/// Full-scale ADC count after the driver's 10-bit down-scaling.
pub const ADC_FULL_SCALE: u16 = 1023;

/// ADC1 channel number for an analog GPIO on the ESP32-S3.
pub const fn adc1_channel(gpio: u8) -> u8 {
    gpio - 1
}

// ---------------------------------------------------------------------------
// Digital inputs
// ---------------------------------------------------------------------------

/// BTD connector 1 (photogate, motion detector echo, ...). HIGH = open gate.
pub const BTD01_GPIO: u8 = 11;
/// BTD connector 2.
pub const BTD02_GPIO: u8 = 12;

/// Momentary push-button, active-low with pull-up.
pub const BUTTON_GPIO: u8 = 0;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Feedback LED (active HIGH).
pub const LED_GPIO: u8 = 13;

// ---------------------------------------------------------------------------
// Host link (USB-serial bridge)
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: u8 = 43;
pub const UART_RX_GPIO: u8 = 44;
pub const UART_BAUD: u32 = 460_800;
