//! Cooperative tick engine.
//!
//! One call to [`Scheduler::tick`] does all of the firmware's work for one
//! pass of the main loop and never blocks.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  tick()                                                      │
//! │                                                              │
//! │  1. SerialLink::read_byte ──▶ CommandFramer::feed_byte       │
//! │        │ invalid ─────────────────────────────▶ NAK          │
//! │        │ complete ──▶ dispatch ──▶ ACK [+ blob | text]       │
//! │        │                       └─▶ NAK                       │
//! │                                                              │
//! │  2. poll ANA105 ANA205 ANA110 ANA210 DIG1 DIG2               │
//! │        │ reading ──▶ blob ──▶ SerialLink::write              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scheduler is the only writer on the link, so replies and blobs are
//! never interleaved.

use log::{info, warn};

use crate::app::context::ShieldContext;
use crate::app::dispatch::{self, Reply};
use crate::app::ports::{Board, SerialLink};
use crate::channels::Reading;
use crate::config::ShieldConfig;
use crate::error::{ConfigError, LinkError, ProtocolError};
use crate::protocol::framer::CommandFramer;

/// What one tick did. Useful for idling the main loop and for tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub bytes_read: usize,
    pub acked: usize,
    pub nacked: usize,
    pub readings: usize,
    pub link_errors: usize,
}

impl TickReport {
    /// Nothing arrived and nothing was sent.
    pub fn is_idle(&self) -> bool {
        self.bytes_read == 0 && self.readings == 0
    }
}

pub struct Scheduler {
    framer: CommandFramer,
    ctx: ShieldContext,
}

impl Scheduler {
    /// Validate `config` and build every channel at its defaults.
    pub fn new(config: ShieldConfig, board: &mut dyn Board) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            framer: CommandFramer::new(),
            ctx: ShieldContext::new(config, board),
        })
    }

    /// Synchronise every channel and greet the host.
    pub fn start(&mut self, board: &mut dyn Board, link: &mut dyn SerialLink) -> Result<(), LinkError> {
        self.ctx.sync_all(board.now_micros());
        let banner = format!(
            "{} ver:{}",
            self.ctx.config.boot_banner,
            self.ctx.config.version()
        );
        info!("{banner}");
        write_line(link, &banner)
    }

    /// One pass: drain input, answer commands, poll channels.
    pub fn tick(&mut self, board: &mut dyn Board, link: &mut dyn SerialLink) -> TickReport {
        let mut report = TickReport::default();

        // ── 1. Inbound bytes and commands ──
        while report.bytes_read < self.ctx.config.max_rx_bytes_per_tick {
            let Some(byte) = link.read_byte() else { break };
            report.bytes_read += 1;
            self.framer.feed_byte(byte);

            if self.framer.is_invalid() {
                warn!("NAK: {}", ProtocolError::ReservedParamCount(self.framer.command()));
                report.nacked += 1;
                note(&mut report, self.framer.bad_command(link));
                continue;
            }

            let Some(cmd) = self.framer.take_command() else {
                continue;
            };

            match dispatch::dispatch(&mut self.ctx, &cmd, board) {
                Ok(reply) => {
                    report.acked += 1;
                    note(&mut report, self.framer.command_successful(link));
                    note(&mut report, send_reply(link, &reply));
                }
                Err(e) => {
                    warn!("NAK 0x{:02X}: {e}", cmd.opcode);
                    report.nacked += 1;
                    note(&mut report, self.framer.bad_command(link));
                }
            }
        }

        // ── 2. Channel polling, fixed order ──
        for i in 0..self.ctx.analog.len() {
            if let Some(r) = self.ctx.analog[i].poll(board) {
                send_reading(&mut report, link, r);
            }
        }
        for i in 0..self.ctx.digital.len() {
            if let Some(r) = self.ctx.digital[i].poll(board) {
                send_reading(&mut report, link, r);
            }
        }

        report
    }

    pub fn context(&self) -> &ShieldContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ShieldContext {
        &mut self.ctx
    }

    pub fn framer(&self) -> &CommandFramer {
        &self.framer
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Text lines go out as `" " + line + "\n"` so the host can tell them from blobs.
fn write_line(link: &mut dyn SerialLink, line: &str) -> Result<(), LinkError> {
    link.write(b" ")?;
    link.write(line.as_bytes())?;
    link.write(b"\n")
}

fn send_reply(link: &mut dyn SerialLink, reply: &Reply) -> Result<(), LinkError> {
    match reply {
        Reply::Ack => Ok(()),
        Reply::Blob(bytes) => link.write(bytes),
        Reply::Text(lines) => lines.iter().try_for_each(|l| write_line(link, l)),
    }
}

fn send_reading(report: &mut TickReport, link: &mut dyn SerialLink, reading: Reading) {
    report.readings += 1;
    note(report, link.write(&reading.to_blob()));
}

fn note(report: &mut TickReport, res: Result<(), LinkError>) {
    if let Err(e) = res {
        warn!("link: {e}");
        report.link_errors += 1;
    }
}
