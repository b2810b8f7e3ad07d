//! Opcode bytes understood by the firmware.
//!
//! Each constant already includes its parameter count in the low two bits,
//! so it can be compared directly against the byte the framer latched.

/// Stop all activity on every channel.
pub const HALT: u8 = 0x80;
/// Arm the channels selected by the parameter bitmask.
pub const ARM: u8 = 0x84 | 0x01;

/// Immediate read of digital port 1.
pub const IMM_DIG1: u8 = 0x8C;
/// Immediate read of digital port 2.
pub const IMM_DIG2: u8 = 0x90;
/// Immediate read of analog channel 1, ±5 V range.
pub const IMM_AN051: u8 = 0x94;
/// Immediate read of analog channel 1, ±10 V range.
pub const IMM_AN101: u8 = 0x98;
/// Immediate read of analog channel 2, ±5 V range.
pub const IMM_AN052: u8 = 0x9C;
/// Immediate read of analog channel 2, ±10 V range.
pub const IMM_AN102: u8 = 0xA0;
/// Immediate read of the push-button.
pub const IMM_BUTSTATE: u8 = 0xA4;

/// Blink the feedback LED.
pub const BLINKLED: u8 = 0xA8 | 0x01;

/// Analog sample-rate code.
pub const MDE_ASAMPTIME: u8 = 0xAC | 0x01;
/// Analog stop count (14 bits).
pub const MDE_ASTOP: u8 = 0xB0 | 0x02;
/// Analog trigger type, channel select and threshold.
pub const MDE_ATRIG: u8 = 0xB4 | 0x02;
/// Digital edge modes for both ports.
pub const MDE_DTRIG: u8 = 0xB8 | 0x01;

/// Firmware version text.
pub const ST_VERS: u8 = 0xC8;
/// Status text for the selected sources (shares its function code with `ST_VERS`).
pub const ST_ANALOG: u8 = 0xC8 | 0x01;

/// Reset the shared epoch and resynchronise every channel.
pub const MDE_SYNC: u8 = 0xD0;
