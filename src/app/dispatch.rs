//! Function-pointer command table.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  COMMAND_TABLE                                             │
//! │  ┌────────┬───────────────┬─────────────────────────────┐  │
//! │  │ opcode │ name          │ handler                     │  │
//! │  ├────────┼───────────────┼─────────────────────────────┤  │
//! │  │ 0x80   │ HALT          │ fn(ctx, cmd, board) -> Reply│  │
//! │  │ 0x85   │ ARM           │ fn(ctx, cmd, board) -> Reply│  │
//! │  │  ...   │  ...          │  ...                        │  │
//! │  └────────┴───────────────┴─────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler looks up the completed opcode byte, runs its handler
//! against the [`ShieldContext`], and answers ACK plus any payload on `Ok`,
//! NAK on `Err` or when the opcode has no row.

use log::{debug, info};

use super::context::{ANA105, ANA110, ANA205, ANA210, DIG1, DIG2, ShieldContext};
use super::ports::Board;
use crate::channels::analog::{AnalogTrigger, SampleRate};
use crate::channels::digital::EdgeMode;
use crate::channels::Reading;
use crate::drivers::button;
use crate::error::ProtocolError;
use crate::protocol::{Source, function_code};
use crate::protocol::blob::BLOB_LEN;
use crate::protocol::framer::Command;
use crate::protocol::opcodes::*;

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// What follows the ACK byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// ACK alone.
    Ack,
    /// ACK then one data blob.
    Blob([u8; BLOB_LEN]),
    /// ACK then one text line per entry.
    Text(Vec<String>),
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

pub type Handler = fn(&mut ShieldContext, &Command, &mut dyn Board) -> Result<Reply, ProtocolError>;

/// One row of the dispatch table.
pub struct CommandEntry {
    pub opcode: u8,
    pub name: &'static str,
    pub handler: Handler,
}

pub static COMMAND_TABLE: [CommandEntry; 17] = [
    CommandEntry { opcode: HALT, name: "HALT", handler: halt },
    CommandEntry { opcode: ARM, name: "ARM", handler: arm },
    CommandEntry { opcode: IMM_DIG1, name: "IMM_DIG1", handler: imm_dig1 },
    CommandEntry { opcode: IMM_DIG2, name: "IMM_DIG2", handler: imm_dig2 },
    CommandEntry { opcode: IMM_AN051, name: "IMM_AN051", handler: imm_an051 },
    CommandEntry { opcode: IMM_AN101, name: "IMM_AN101", handler: imm_an101 },
    CommandEntry { opcode: IMM_AN052, name: "IMM_AN052", handler: imm_an052 },
    CommandEntry { opcode: IMM_AN102, name: "IMM_AN102", handler: imm_an102 },
    CommandEntry { opcode: IMM_BUTSTATE, name: "IMM_BUTSTATE", handler: imm_butstate },
    CommandEntry { opcode: BLINKLED, name: "BLINKLED", handler: blink_led },
    CommandEntry { opcode: MDE_ASAMPTIME, name: "MDE_ASAMPTIME", handler: analog_sample_time },
    CommandEntry { opcode: MDE_ASTOP, name: "MDE_ASTOP", handler: analog_stop },
    CommandEntry { opcode: MDE_ATRIG, name: "MDE_ATRIG", handler: analog_trigger },
    CommandEntry { opcode: MDE_DTRIG, name: "MDE_DTRIG", handler: digital_trigger },
    CommandEntry { opcode: ST_VERS, name: "ST_VERS", handler: status_version },
    CommandEntry { opcode: ST_ANALOG, name: "ST_ANALOG", handler: status_sources },
    CommandEntry { opcode: MDE_SYNC, name: "MDE_SYNC", handler: sync },
];

pub fn lookup(opcode: u8) -> Option<&'static CommandEntry> {
    COMMAND_TABLE.iter().find(|e| e.opcode == opcode)
}

/// Run the handler for `cmd`. Unknown opcodes fail with `UnknownOpcode`.
pub fn dispatch(
    ctx: &mut ShieldContext,
    cmd: &Command,
    board: &mut dyn Board,
) -> Result<Reply, ProtocolError> {
    let Some(entry) = lookup(cmd.opcode) else {
        debug!("no handler for function code 0x{:02X}", function_code(cmd.opcode));
        return Err(ProtocolError::UnknownOpcode(cmd.opcode));
    };
    debug!("dispatch {} {:02X?}", entry.name, cmd.params.as_slice());
    (entry.handler)(ctx, cmd, board)
}

// ---------------------------------------------------------------------------
// Run control
// ---------------------------------------------------------------------------

fn halt(ctx: &mut ShieldContext, _cmd: &Command, _board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    ctx.halt_all();
    Ok(Reply::Ack)
}

fn arm(ctx: &mut ShieldContext, cmd: &Command, _board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    ctx.arm_selected(cmd.parameter(1));
    Ok(Reply::Ack)
}

fn sync(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    ctx.sync_all(board.now_micros());
    Ok(Reply::Ack)
}

// ---------------------------------------------------------------------------
// Immediate reads
// ---------------------------------------------------------------------------

fn blob(reading: Reading) -> Result<Reply, ProtocolError> {
    Ok(Reply::Blob(reading.to_blob()))
}

fn imm_dig1(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    blob(ctx.digital[DIG1].read_now(board))
}

fn imm_dig2(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    blob(ctx.digital[DIG2].read_now(board))
}

fn imm_an051(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    blob(ctx.analog[ANA105].read_now(board))
}

fn imm_an101(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    blob(ctx.analog[ANA110].read_now(board))
}

fn imm_an052(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    blob(ctx.analog[ANA205].read_now(board))
}

fn imm_an102(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    blob(ctx.analog[ANA210].read_now(board))
}

fn imm_butstate(ctx: &mut ShieldContext, _cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    let pressed = button::is_pressed(board);
    blob(Reading {
        sequence: 0,
        raw: u16::from(pressed),
        source: Source::Button,
        timestamp_us: ctx.epoch.elapsed(board.now_micros()),
    })
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// `0ccc pppp`: `ccc` blinks, period `pppp << 7` ms (0 keeps the current one).
fn blink_led(_ctx: &mut ShieldContext, cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    let p = cmd.parameter(1);
    let count = (p & 0x70) >> 4;
    let period_ms = u32::from(p & 0x0F) << 7;
    board.blink(count, (period_ms > 0).then_some(period_ms));
    Ok(Reply::Ack)
}

fn analog_sample_time(
    ctx: &mut ShieldContext,
    cmd: &Command,
    board: &mut dyn Board,
) -> Result<Reply, ProtocolError> {
    let code = cmd.parameter(1);
    let rate = SampleRate::from_code(code).ok_or(ProtocolError::InvalidSampleRate(code))?;
    let now = board.now_micros();
    for ch in &mut ctx.analog {
        ch.set_sample_rate(code, now)?;
    }
    info!("analog rate {:?} ({} us)", rate, rate.period_us());
    Ok(Reply::Ack)
}

fn analog_stop(ctx: &mut ShieldContext, cmd: &Command, _board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    let count = (cmd.parameter_value() & 0x3FFF) as u16;
    for ch in &mut ctx.analog {
        ch.set_stop_condition(count);
    }
    Ok(Reply::Ack)
}

/// `tt cc vvvvvvvvvv`: trigger type, channel select, 10-bit threshold.
fn analog_trigger(ctx: &mut ShieldContext, cmd: &Command, _board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    let v = cmd.parameter_value();
    let kind = ((v >> 12) & 0x03) as u8;
    let select = (v >> 10) & 0x03;
    let trigger = AnalogTrigger::from_parts(kind, (v & 0x3FF) as u16);

    if select & 0x01 != 0 {
        ctx.analog[ANA105].set_trigger(trigger);
        ctx.analog[ANA110].set_trigger(trigger);
    }
    if select & 0x02 != 0 {
        ctx.analog[ANA205].set_trigger(trigger);
        ctx.analog[ANA210].set_trigger(trigger);
    }
    debug!("analog trigger {trigger} on select {select:#04b}");
    Ok(Reply::Ack)
}

/// Low nibble DIG1, high bits DIG2.
fn digital_trigger(ctx: &mut ShieldContext, cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    let p = cmd.parameter(1);
    ctx.digital[DIG1].set_trigger(EdgeMode::from_code(p & 0x0F), board);
    ctx.digital[DIG2].set_trigger(EdgeMode::from_code(p >> 4), board);
    Ok(Reply::Ack)
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

fn status_version(ctx: &mut ShieldContext, _cmd: &Command, _board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    Ok(Reply::Text(vec![format!("v:{}", ctx.config.version())]))
}

/// One `"LABEL":{...}` line per selected source.
fn status_sources(ctx: &mut ShieldContext, cmd: &Command, board: &mut dyn Board) -> Result<Reply, ProtocolError> {
    let mask = cmd.parameter(1);
    let mut lines = Vec::new();

    for source in Source::ALL.into_iter().filter(|s| s.selected_by(mask)) {
        let body = match source {
            Source::Button => button::is_pressed(board).to_string(),
            Source::Dig1 | Source::Dig2 => ctx
                .digital_mut(source)
                .map(|ch| serde_json::to_string(&ch.status()).unwrap_or_default())
                .ok_or(ProtocolError::NoSuchChannel(source.id()))?,
            _ => ctx
                .analog_mut(source)
                .map(|ch| serde_json::to_string(&ch.status()).unwrap_or_default())
                .ok_or(ProtocolError::NoSuchChannel(source.id()))?,
        };
        lines.push(format!("\"{}\":{}", source.label(), body));
    }

    Ok(Reply::Text(lines))
}
