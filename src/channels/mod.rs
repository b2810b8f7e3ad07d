//! Acquisition channels.
//!
//! Each channel is a small polling state machine. The scheduler calls
//! `poll()` once per tick; a channel answers with at most one [`Reading`],
//! which the scheduler encodes and sends before polling the next channel.

pub mod analog;
pub mod calibration;
pub mod digital;

use crate::protocol::Source;
use crate::protocol::blob::{self, BLOB_LEN};

/// One sample ready for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// Running count for this run (digital: transition count).
    pub sequence: u32,
    /// ADC count, logic level, or edge direction code.
    pub raw: u16,
    pub source: Source,
    /// Microseconds since the channel's sync point.
    pub timestamp_us: u32,
}

impl Reading {
    pub fn to_blob(&self) -> [u8; BLOB_LEN] {
        blob::encode(self.sequence, self.raw, self.source.id(), self.timestamp_us)
    }
}

/// Wrap-aware `now >= deadline` on the 32-bit microsecond clock.
pub(crate) fn deadline_reached(now_us: u32, deadline_us: u32) -> bool {
    now_us.wrapping_sub(deadline_us) as i32 >= 0
}

/// Channel time origin: the shared epoch when one is set, otherwise `now`.
pub(crate) fn origin(epoch_us: u32, now_us: u32) -> u32 {
    if epoch_us > 0 { epoch_us } else { now_us }
}
