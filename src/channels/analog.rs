//! Analog acquisition channel.
//!
//! ```text
//!          arm()               trigger satisfied
//!   Halt ─────────▶ Armed ─────────────────────▶ Run
//!    ▲                                            │
//!    └────────── stop count reached / halt() ─────┘
//! ```
//!
//! In `Run` the channel samples on a fixed period, or once per completed
//! button press when the period is zero.

use core::fmt;

use log::{debug, info};
use serde::{Serialize, Serializer};

use super::calibration::Calibration;
use super::{Reading, deadline_reached, origin};
use crate::app::ports::Board;
use crate::drivers::button::{self, ReleaseDetector};
use crate::error::ProtocolError;
use crate::protocol::Source;

/// Largest stop count the 14-bit `MDE_ASTOP` parameter can carry.
pub const MAX_STOP_COUNT: u16 = 0x3FFF;
/// Largest trigger threshold (10-bit ADC).
pub const MAX_THRESHOLD: u16 = 0x3FF;

// ---------------------------------------------------------------------------
// Sample-rate table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SampleRate {
    /// One sample per button press.
    ButtonPress = 0,
    /// As fast as the tick loop runs.
    Fastest = 1,
    KHz1 = 2,
    Hz500 = 3,
    Hz200 = 4,
    Hz100 = 5,
    Hz50 = 6,
    Hz40 = 7,
    Hz20 = 8,
    Hz10 = 9,
    Hz5 = 10,
    Hz1 = 11,
    S2 = 12,
    S5 = 13,
    S10 = 14,
    S30 = 15,
}

impl SampleRate {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::ButtonPress,
            1 => Self::Fastest,
            2 => Self::KHz1,
            3 => Self::Hz500,
            4 => Self::Hz200,
            5 => Self::Hz100,
            6 => Self::Hz50,
            7 => Self::Hz40,
            8 => Self::Hz20,
            9 => Self::Hz10,
            10 => Self::Hz5,
            11 => Self::Hz1,
            12 => Self::S2,
            13 => Self::S5,
            14 => Self::S10,
            15 => Self::S30,
            _ => return None,
        })
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Sampling period in microseconds; 0 means button-gated.
    pub const fn period_us(self) -> u32 {
        match self {
            Self::ButtonPress => 0,
            Self::Fastest => 1,
            Self::KHz1 => 1_000,
            Self::Hz500 => 2_000,
            Self::Hz200 => 5_000,
            Self::Hz100 => 10_000,
            Self::Hz50 => 20_000,
            Self::Hz40 => 25_000,
            Self::Hz20 => 50_000,
            Self::Hz10 => 100_000,
            Self::Hz5 => 200_000,
            Self::Hz1 => 1_000_000,
            Self::S2 => 2_000_000,
            Self::S5 => 5_000_000,
            Self::S10 => 10_000_000,
            Self::S30 => 30_000_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Run state and trigger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalogState {
    #[serde(rename = "H")]
    Halt,
    #[serde(rename = "A")]
    Armed,
    #[serde(rename = "R")]
    Run,
}

/// Condition that moves an armed channel into `Run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogTrigger {
    Immediate,
    /// Raw reading strictly below the threshold.
    FallBelow(u16),
    /// Raw reading strictly above the threshold.
    RiseAbove(u16),
    /// Button currently held down.
    ButtonPress,
}

impl AnalogTrigger {
    /// Build from the 2-bit type field and 10-bit threshold of `MDE_ATRIG`.
    pub fn from_parts(kind: u8, threshold: u16) -> Self {
        let threshold = threshold & MAX_THRESHOLD;
        match kind & 0x03 {
            1 => Self::FallBelow(threshold),
            2 => Self::RiseAbove(threshold),
            3 => Self::ButtonPress,
            _ => Self::Immediate,
        }
    }
}

impl fmt::Display for AnalogTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "I"),
            Self::FallBelow(t) => write!(f, "F({t})"),
            Self::RiseAbove(t) => write!(f, "R({t})"),
            Self::ButtonPress => write!(f, "B"),
        }
    }
}

impl Serialize for AnalogTrigger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read-only view for status reports.
#[derive(Debug, Clone, Serialize)]
pub struct AnalogStatus {
    pub state: AnalogState,
    #[serde(rename = "period")]
    pub period_us: u32,
    pub trigger: AnalogTrigger,
    pub stop: u16,
    pub units: &'static str,
    pub name: &'static str,
    #[serde(rename = "shortname")]
    pub short_name: &'static str,
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

pub struct AnalogChannel {
    source: Source,
    pin: u8,
    name: &'static str,
    short_name: &'static str,
    calibration: Calibration,

    state: AnalogState,
    rate: SampleRate,
    trigger: AnalogTrigger,
    stop: u16,

    count: u32,
    last_raw: u16,
    start_us: u32,
    next_read_us: u32,
    timestamp_us: u32,

    release: ReleaseDetector,
}

impl AnalogChannel {
    /// Channel at power-on defaults: 10 Hz, stop after 100, immediate, halted.
    pub fn new(source: Source, pin: u8, now_us: u32) -> Self {
        let mut ch = Self {
            source,
            pin,
            name: "Gen Analog",
            short_name: "GA",
            calibration: Calibration::RAW,
            state: AnalogState::Halt,
            rate: SampleRate::Hz10,
            trigger: AnalogTrigger::Immediate,
            stop: 100,
            count: 0,
            last_raw: 0,
            start_us: 0,
            next_read_us: 0,
            timestamp_us: 0,
            release: ReleaseDetector::default(),
        };
        ch.sync(0, now_us);
        ch
    }

    /// Attach a sensor description and its conversion.
    pub fn with_sensor(
        mut self,
        name: &'static str,
        short_name: &'static str,
        calibration: Calibration,
    ) -> Self {
        self.name = name;
        self.short_name = short_name;
        self.calibration = calibration;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u32) -> Self {
        self.release = ReleaseDetector::new(debounce_ms);
        self
    }

    // --- Run control ---

    /// Start a fresh run; sampling begins once the trigger is satisfied.
    pub fn arm(&mut self) {
        self.state = AnalogState::Armed;
        self.count = 0;
        self.release.reset();
        info!("{}: armed ({})", self.source.label(), self.trigger);
    }

    pub fn halt(&mut self) {
        if self.state != AnalogState::Halt {
            debug!("{}: halted after {} readings", self.source.label(), self.count);
        }
        self.state = AnalogState::Halt;
    }

    /// Advance the state machine by one tick.
    pub fn poll(&mut self, board: &mut dyn Board) -> Option<Reading> {
        match self.state {
            AnalogState::Halt => return None,
            AnalogState::Armed => {
                let now = board.now_micros();
                if self.trigger_satisfied(board) {
                    self.state = AnalogState::Run;
                    self.next_read_us = now.wrapping_add(self.rate.period_us());
                    debug!("{}: triggered", self.source.label());
                }
                return None;
            }
            AnalogState::Run => {}
        }

        if self.stop != 0 && self.count >= u32::from(self.stop) {
            self.halt();
            return None;
        }

        let now = board.now_micros();
        let period = self.rate.period_us();

        if period == 0 {
            let pressed = button::is_pressed(board);
            if !self.release.update(pressed, now) {
                return None;
            }
            self.next_read_us = now;
        } else {
            if !deadline_reached(now, self.next_read_us) {
                return None;
            }
            self.next_read_us = self.next_read_us.wrapping_add(period);
            if deadline_reached(now, self.next_read_us) {
                // More than a period behind: restart the schedule from now.
                self.next_read_us = now.wrapping_add(period);
            }
        }

        Some(self.take_sample(board, now))
    }

    fn trigger_satisfied(&mut self, board: &mut dyn Board) -> bool {
        match self.trigger {
            AnalogTrigger::Immediate => true,
            AnalogTrigger::RiseAbove(level) => board.read_analog(self.pin) > level,
            AnalogTrigger::FallBelow(level) => board.read_analog(self.pin) < level,
            AnalogTrigger::ButtonPress => button::is_pressed(board),
        }
    }

    fn take_sample(&mut self, board: &mut dyn Board, now: u32) -> Reading {
        self.last_raw = board.read_analog(self.pin);
        self.timestamp_us = now.wrapping_sub(self.start_us);
        self.count = self.count.wrapping_add(1);
        debug!(
            "{} #{}: {} = {:.3} {}",
            self.source.label(),
            self.count,
            self.last_raw,
            self.last_value(),
            self.calibration.units()
        );
        Reading {
            sequence: self.count,
            raw: self.last_raw,
            source: self.source,
            timestamp_us: self.timestamp_us,
        }
    }

    /// Single conversion outside any run; sequence 0.
    pub fn read_now(&mut self, board: &mut dyn Board) -> Reading {
        let raw = board.read_analog(self.pin);
        Reading {
            sequence: 0,
            raw,
            source: self.source,
            timestamp_us: board.now_micros().wrapping_sub(self.start_us),
        }
    }

    // --- Configuration ---

    /// Apply a rate-table code and restart the channel clock at `now_us`.
    pub fn set_sample_rate(&mut self, code: u8, now_us: u32) -> Result<(), ProtocolError> {
        let rate = SampleRate::from_code(code).ok_or(ProtocolError::InvalidSampleRate(code))?;
        self.rate = rate;
        self.sync(0, now_us);
        Ok(())
    }

    pub fn set_trigger(&mut self, trigger: AnalogTrigger) {
        self.trigger = trigger;
        self.state = AnalogState::Halt;
    }

    /// Readings per run before halting; 0 runs until halted.
    pub fn set_stop_condition(&mut self, count: u16) {
        self.stop = count & MAX_STOP_COUNT;
    }

    /// Zero counters and restart the clock at `epoch_us` (or `now_us` when unset).
    pub fn sync(&mut self, epoch_us: u32, now_us: u32) {
        self.last_raw = 0;
        self.start_us = origin(epoch_us, now_us);
        self.next_read_us = self.start_us.wrapping_add(self.rate.period_us());
        self.count = 0;
        self.state = AnalogState::Halt;
        self.timestamp_us = 0;
        self.release.reset();
    }

    // --- Queries ---

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn state(&self) -> AnalogState {
        self.state
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.rate
    }

    pub fn trigger(&self) -> AnalogTrigger {
        self.trigger
    }

    pub fn stop_condition(&self) -> u16 {
        self.stop
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn last_raw(&self) -> u16 {
        self.last_raw
    }

    /// Calibrated value of the last reading.
    pub fn last_value(&self) -> f32 {
        self.calibration.apply(self.last_raw)
    }

    /// Microseconds since the channel's sync point.
    pub fn current_time(&self, now_us: u32) -> u32 {
        now_us.wrapping_sub(self.start_us)
    }

    pub fn status(&self) -> AnalogStatus {
        AnalogStatus {
            state: self.state,
            period_us: self.rate.period_us(),
            trigger: self.trigger,
            stop: self.stop,
            units: self.calibration.units(),
            name: self.name,
            short_name: self.short_name,
        }
    }
}
