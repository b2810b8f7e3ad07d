//! Streaming command framer.
//!
//! Bytes arrive one at a time from the serial link. An opcode byte (high bit
//! set) always starts a new command, abandoning whatever was half-built, so
//! the framer resynchronises on the next well-formed opcode after any loss.
//! Parameter bytes that arrive while no command is being built are dropped.
//!
//! A completed or invalid command is held until the caller answers it with
//! [`CommandFramer::command_successful`] or [`CommandFramer::bad_command`].

use heapless::Vec;
use log::debug;

use super::{ACK, NAK, RESERVED_PARAM_COUNT, is_opcode, param_count};
use crate::app::ports::SerialLink;
use crate::error::LinkError;

/// Parameter storage. Opcodes declare at most two, the composer handles three.
pub const MAX_PARAMS: usize = 3;

/// Framer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    /// Ready for a new opcode byte.
    AwaitingOpcode,
    /// Opcode latched, `remaining` parameter bytes still expected.
    Collecting { remaining: u8 },
    /// Opcode and every declared parameter received.
    Complete,
    /// Opcode declared the reserved parameter count.
    Invalid,
}

/// Snapshot of a completed command, detached from the framer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub opcode: u8,
    pub params: Vec<u8, MAX_PARAMS>,
}

impl Command {
    pub fn new(opcode: u8, params: &[u8]) -> Self {
        let mut p = Vec::new();
        for &b in params.iter().take(MAX_PARAMS) {
            let _ = p.push(b & 0x7F);
        }
        Self { opcode, params: p }
    }

    /// 1-based parameter access; `0` outside the collected range.
    pub fn parameter(&self, index: usize) -> u8 {
        index
            .checked_sub(1)
            .and_then(|i| self.params.get(i).copied())
            .unwrap_or(0)
    }

    /// Parameters composed as 7-bit digits, first byte most significant.
    pub fn parameter_value(&self) -> u32 {
        compose(&self.params)
    }
}

/// `p1 << 7(N-1) | ... | pN` over 7-bit digits.
pub fn compose(params: &[u8]) -> u32 {
    params
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | u32::from(b & 0x7F))
}

/// Incremental opcode/parameter parser.
pub struct CommandFramer {
    state: FramerState,
    opcode: u8,
    params: Vec<u8, MAX_PARAMS>,
}

impl CommandFramer {
    pub fn new() -> Self {
        Self {
            state: FramerState::AwaitingOpcode,
            opcode: 0,
            params: Vec::new(),
        }
    }

    /// Consume one inbound byte.
    pub fn feed_byte(&mut self, byte: u8) {
        if is_opcode(byte) {
            if self.is_building() {
                debug!(
                    "framer: 0x{:02X} abandoned after {} params",
                    self.opcode,
                    self.params.len()
                );
            }
            self.opcode = byte;
            self.params.clear();
            self.state = match param_count(byte) {
                0 => FramerState::Complete,
                RESERVED_PARAM_COUNT => FramerState::Invalid,
                n => FramerState::Collecting { remaining: n },
            };
            return;
        }

        let FramerState::Collecting { remaining } = self.state else {
            // Stray parameter byte.
            return;
        };

        // Capacity is never exceeded: `remaining` starts at most at 2.
        let _ = self.params.push(byte);
        self.state = if remaining <= 1 {
            FramerState::Complete
        } else {
            FramerState::Collecting {
                remaining: remaining - 1,
            }
        };
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// An opcode is latched and parameters are still expected.
    pub fn is_building(&self) -> bool {
        matches!(self.state, FramerState::Collecting { .. })
    }

    pub fn is_complete(&self) -> bool {
        self.state == FramerState::Complete
    }

    /// No command is pending; the next opcode starts cleanly.
    pub fn is_ready_to_receive(&self) -> bool {
        self.state == FramerState::AwaitingOpcode
    }

    pub fn is_invalid(&self) -> bool {
        self.state == FramerState::Invalid
    }

    /// The latched opcode byte.
    pub fn command(&self) -> u8 {
        self.opcode
    }

    /// 1-based parameter in feed order, `0` outside the collected range.
    pub fn parameter(&self, index: usize) -> u8 {
        index
            .checked_sub(1)
            .and_then(|i| self.params.get(i).copied())
            .unwrap_or(0)
    }

    pub fn parameter_value(&self) -> u32 {
        compose(&self.params)
    }

    /// Detached copy of the held command, if one is complete.
    pub fn take_command(&self) -> Option<Command> {
        self.is_complete()
            .then(|| Command::new(self.opcode, &self.params))
    }

    /// Acknowledge the held command and return to ready.
    pub fn command_successful(&mut self, link: &mut dyn SerialLink) -> Result<(), LinkError> {
        self.reset();
        link.write(&[ACK])
    }

    /// Reject the held command and return to ready.
    pub fn bad_command(&mut self, link: &mut dyn SerialLink) -> Result<(), LinkError> {
        self.reset();
        link.write(&[NAK])
    }

    fn reset(&mut self) {
        self.state = FramerState::AwaitingOpcode;
        self.params.clear();
    }
}

impl Default for CommandFramer {
    fn default() -> Self {
        Self::new()
    }
}
