//! Unified error types for the LabShield firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! tick loop's error handling uniform.  All variants are `Copy` so they can be
//! handed from the dispatch table to the NAK path without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A host command was malformed or could not be honoured.
    Protocol(ProtocolError),
    /// An analog or digital input could not be read.
    Sensor(SensorError),
    /// The serial link refused a write.
    Link(LinkError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Protocol errors (each one becomes a NAK on the wire)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Opcode declared the reserved parameter count of 3.
    ReservedParamCount(u8),
    /// Opcode is not in the dispatch table.
    UnknownOpcode(u8),
    /// Sample-rate code outside the rate table.
    InvalidSampleRate(u8),
    /// Command referenced a channel that does not exist.
    NoSuchChannel(u8),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedParamCount(op) => write!(f, "reserved parameter count in 0x{op:02X}"),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode 0x{op:02X}"),
            Self::InvalidSampleRate(code) => write!(f, "invalid sample-rate code {code}"),
            Self::NoSuchChannel(src) => write!(f, "no channel with source id {src}"),
        }
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// The pin is not wired to any channel.
    UnmappedPin(u8),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::UnmappedPin(pin) => write!(f, "pin {pin} is not mapped"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Serial link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport accepted fewer bytes than requested.
    ShortWrite { written: usize, expected: usize },
    /// The transport driver reported a failure.
    WriteFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortWrite { written, expected } => {
                write!(f, "short write ({written} of {expected} bytes)")
            }
            Self::WriteFailed => write!(f, "write failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A field failed range validation; the string names the field.
    ValidationFailed(&'static str),
    /// Stored configuration could not be parsed.
    Corrupted,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(field) => write!(f, "validation failed: {field}"),
            Self::Corrupted => write!(f, "config corrupted"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ProtocolError {}
impl std::error::Error for SensorError {}
impl std::error::Error for LinkError {}
impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
