//! Digital edge-timing channel (photogates, pulse sensors).
//!
//! ```text
//!        ◀─ rising ─▶
//!             ◀── falling ──▶
//!        ┌──────┐      ┌──────┐
//!   ─────┘      └──────┘      └────
//!         ◀─any─▶◀─any─▶◀─any─▶
//! ```
//!
//! A running channel reports every level transition that matches its edge
//! mode. Non-matching transitions only move the baseline level.

use log::{debug, info};
use serde::Serialize;

use super::{Reading, origin};
use crate::app::ports::Board;
use crate::protocol::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DigitalState {
    #[serde(rename = "H")]
    Halt,
    #[serde(rename = "R")]
    Run,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeMode {
    #[serde(rename = "A")]
    Any,
    #[serde(rename = "R")]
    RisingOnly,
    #[serde(rename = "F")]
    FallingOnly,
}

impl EdgeMode {
    /// `MDE_DTRIG` nibble: 1 rising, 2 falling, anything else any edge.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::RisingOnly,
            2 => Self::FallingOnly,
            _ => Self::Any,
        }
    }

    pub fn accepts(self, edge: Edge) -> bool {
        match self {
            Self::Any => true,
            Self::RisingOnly => edge == Edge::Rising,
            Self::FallingOnly => edge == Edge::Falling,
        }
    }
}

/// Transition direction; the discriminant is the wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Edge {
    Rising = 1,
    Falling = 2,
}

#[derive(Debug, Clone, Serialize)]
pub struct DigitalStatus {
    pub state: DigitalState,
    pub trigger: EdgeMode,
    pub transitions: u32,
}

pub struct DigitalChannel {
    source: Source,
    pin: u8,
    state: DigitalState,
    mode: EdgeMode,

    level: bool,
    count: u32,
    last_edge: Option<Edge>,
    delta_us: u32,
    abs_us: u32,
    start_us: u32,
}

impl DigitalChannel {
    /// Halted, any-edge, baseline sampled from the pin.
    pub fn new(source: Source, pin: u8, board: &mut dyn Board) -> Self {
        let mut ch = Self {
            source,
            pin,
            state: DigitalState::Halt,
            mode: EdgeMode::Any,
            level: false,
            count: 0,
            last_edge: None,
            delta_us: 0,
            abs_us: 0,
            start_us: 0,
        };
        ch.set_trigger(EdgeMode::Any, board);
        ch
    }

    pub fn arm(&mut self) {
        self.state = DigitalState::Run;
        info!("{}: armed ({:?})", self.source.label(), self.mode);
    }

    pub fn halt(&mut self) {
        self.state = DigitalState::Halt;
    }

    pub fn poll(&mut self, board: &mut dyn Board) -> Option<Reading> {
        if self.state == DigitalState::Halt {
            return None;
        }

        let level = board.read_digital(self.pin);
        if level == self.level {
            return None;
        }
        let now = board.now_micros();
        self.level = level;

        let edge = if level { Edge::Rising } else { Edge::Falling };
        if !self.mode.accepts(edge) {
            return None;
        }

        let t = now.wrapping_sub(self.start_us);
        self.count = self.count.wrapping_add(1);
        self.last_edge = Some(edge);
        self.delta_us = t.wrapping_sub(self.abs_us);
        self.abs_us = t;

        Some(Reading {
            sequence: self.count,
            raw: edge as u16,
            source: self.source,
            timestamp_us: t,
        })
    }

    /// Change edge mode. Halts, takes the current level as baseline and
    /// restarts the clock.
    pub fn set_trigger(&mut self, mode: EdgeMode, board: &mut dyn Board) {
        self.halt();
        self.mode = mode;
        self.level = board.read_digital(self.pin);
        let now = board.now_micros();
        self.sync(0, now);
        debug!("{}: edge mode {:?}, baseline {}", self.source.label(), mode, self.level);
    }

    /// Zero counters and timestamps. Run state is left alone.
    pub fn sync(&mut self, epoch_us: u32, now_us: u32) {
        self.start_us = origin(epoch_us, now_us);
        self.count = 0;
        self.last_edge = None;
        self.delta_us = 0;
        self.abs_us = 0;
    }

    /// Current level outside any run; sequence 0, raw = level.
    pub fn read_now(&mut self, board: &mut dyn Board) -> Reading {
        let level = board.read_digital(self.pin);
        Reading {
            sequence: 0,
            raw: u16::from(level),
            source: self.source,
            timestamp_us: board.now_micros().wrapping_sub(self.start_us),
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn state(&self) -> DigitalState {
        self.state
    }

    pub fn mode(&self) -> EdgeMode {
        self.mode
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn last_edge(&self) -> Option<Edge> {
        self.last_edge
    }

    /// Time between the last two reported transitions.
    pub fn delta_us(&self) -> u32 {
        self.delta_us
    }

    pub fn current_time(&self, now_us: u32) -> u32 {
        now_us.wrapping_sub(self.start_us)
    }

    pub fn status(&self) -> DigitalStatus {
        DigitalStatus {
            state: self.state,
            trigger: self.mode,
            transitions: self.count,
        }
    }
}
