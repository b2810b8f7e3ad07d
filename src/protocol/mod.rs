//! Host wire protocol.
//!
//! ```text
//!  opcode byte     1 f f f f f n n     f = function code, n = parameter count (0..=2)
//!  parameter byte  0 v v v v v v v     7-bit payload, most significant byte first
//!
//!  replies         '!' (ACK) | '?' (NAK) | 8-byte data blob | " text\n"
//! ```
//!
//! The [`framer`] assembles commands from the inbound byte stream and the
//! [`blob`] encoder produces the fixed-size reading records.

pub mod blob;
pub mod framer;
pub mod opcodes;

use serde::Serialize;

/// Positive acknowledgement (`!`).
pub const ACK: u8 = 0x21;
/// Negative acknowledgement (`?`).
pub const NAK: u8 = 0x3F;

/// High bit marks an opcode byte.
pub const OPCODE_FLAG: u8 = 0x80;
/// Low two bits of an opcode carry its parameter count.
pub const PARAM_COUNT_MASK: u8 = 0x03;
/// Parameter count that is never valid.
pub const RESERVED_PARAM_COUNT: u8 = 3;

/// Whether `byte` starts a new command.
pub const fn is_opcode(byte: u8) -> bool {
    byte & OPCODE_FLAG != 0
}

/// Declared parameter count of an opcode byte.
pub const fn param_count(opcode: u8) -> u8 {
    opcode & PARAM_COUNT_MASK
}

/// 5-bit function code of an opcode byte.
pub const fn function_code(opcode: u8) -> u8 {
    (opcode >> 2) & 0x1F
}

/// 3-bit source tag carried in every data blob.
///
/// Channel-selection bitmasks (ARM, status) use bit `id - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum Source {
    Dig1 = 1,
    Dig2 = 2,
    Ana105 = 3,
    Ana205 = 4,
    Ana110 = 5,
    Ana210 = 6,
    Button = 7,
}

impl Source {
    /// Sources in the order status reports list them.
    pub const ALL: [Source; 7] = [
        Source::Ana105,
        Source::Ana205,
        Source::Ana110,
        Source::Ana210,
        Source::Dig1,
        Source::Dig2,
        Source::Button,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Bit this source occupies in a channel-selection mask.
    pub const fn mask(self) -> u8 {
        1 << (self as u8 - 1)
    }

    /// Whether `mask` selects this source.
    pub const fn selected_by(self, mask: u8) -> bool {
        mask & self.mask() != 0
    }

    /// Connector label used in status reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dig1 => "BTD01",
            Self::Dig2 => "BTD02",
            Self::Ana105 => "BTA01_5V",
            Self::Ana205 => "BTA02_5V",
            Self::Ana110 => "BTA01_10V",
            Self::Ana210 => "BTA02_10V",
            Self::Button => "BTN",
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Dig1),
            2 => Some(Self::Dig2),
            3 => Some(Self::Ana105),
            4 => Some(Self::Ana205),
            5 => Some(Self::Ana110),
            6 => Some(Self::Ana210),
            7 => Some(Self::Button),
            _ => None,
        }
    }
}
