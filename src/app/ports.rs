//! Port traits: the boundary between the acquisition core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler / channels (domain)
//! ```
//!
//! Channels and dispatch handlers only ever see a [`Board`] and a
//! [`SerialLink`]; the ESP adapters and the test mocks implement them.
//! The narrower ports below are the pieces a concrete board is assembled from.

use log::info;

use crate::error::{LinkError, SensorError};

// ───────────────────────────────────────────────────────────────
// Board port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Everything a channel needs from the carrier board.
pub trait Board {
    /// Logic level of a digital input (`true` = high).
    fn read_digital(&mut self, pin: u8) -> bool;

    /// 10-bit ADC count for an analog input.
    fn read_analog(&mut self, pin: u8) -> u16;

    /// Free-running microsecond clock. Wraps after ~71 minutes.
    fn now_micros(&self) -> u32;

    /// Flash the feedback LED `count` times; `None` keeps the current period.
    fn blink(&mut self, count: u8, period_ms: Option<u32>) {
        info!("blink x{count} (period {period_ms:?})");
    }
}

// ───────────────────────────────────────────────────────────────
// Serial link port (driven adapter: domain ↔ host)
// ───────────────────────────────────────────────────────────────

/// Byte transport to the host. The scheduler is the only writer.
pub trait SerialLink {
    /// Next buffered inbound byte, if any. Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write every byte of `bytes` or report why not.
    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Board building blocks
// ───────────────────────────────────────────────────────────────

/// One-shot ADC conversions.
pub trait AnalogReader {
    fn read_raw(&mut self, pin: u8) -> Result<u16, SensorError>;
}

/// Monotonic time source.
pub trait MicrosClock {
    /// Microseconds, truncated to 32 bits.
    fn now_micros(&self) -> u32;

    /// Milliseconds counted from the full-width clock, so they wrap at
    /// `u32::MAX` ms and not when the microsecond value does.
    fn now_millis(&self) -> u32;
}

/// Feedback LED driven without blocking the tick loop.
pub trait Indicator {
    /// Queue `count` blinks; `None` keeps the current period.
    fn blink(&mut self, count: u8, period_ms: Option<u32>);

    /// Advance the blink pattern from a full-width millisecond clock.
    fn update(&mut self, _now_ms: u32) {}
}
