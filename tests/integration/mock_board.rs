//! Mock board and serial link for integration tests.
//!
//! The board holds pin levels, ADC counts and a settable clock; the link
//! records every byte the scheduler writes so tests can split the output
//! back into ACKs, blobs and text lines.

use labshield::app::ports::{Board, SerialLink};
use labshield::config::ShieldConfig;
use labshield::error::LinkError;
use labshield::pins;
use labshield::protocol::blob::{self, BLOB_FLAG, BLOB_LEN, DecodedBlob};
use labshield::protocol::{ACK, NAK};
use labshield::scheduler::{Scheduler, TickReport};
use std::collections::{HashMap, VecDeque};

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub now_us: u32,
    pub levels: HashMap<u8, bool>,
    pub analog: HashMap<u8, u16>,
    pub blinks: Vec<(u8, Option<u32>)>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            now_us: 10_000,
            levels: HashMap::new(),
            analog: HashMap::new(),
            blinks: Vec::new(),
        }
    }

    pub fn advance_us(&mut self, us: u32) {
        self.now_us = self.now_us.wrapping_add(us);
    }

    pub fn set_level(&mut self, pin: u8, high: bool) {
        self.levels.insert(pin, high);
    }

    pub fn set_analog(&mut self, pin: u8, raw: u16) {
        self.analog.insert(pin, raw);
    }

    pub fn press_button(&mut self, down: bool) {
        self.set_level(pins::BUTTON_GPIO, !down);
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Board for MockBoard {
    /// Unset pins idle high (button released, gates open).
    fn read_digital(&mut self, pin: u8) -> bool {
        self.levels.get(&pin).copied().unwrap_or(true)
    }

    fn read_analog(&mut self, pin: u8) -> u16 {
        self.analog.get(&pin).copied().unwrap_or(512)
    }

    fn now_micros(&self) -> u32 {
        self.now_us
    }

    fn blink(&mut self, count: u8, period_ms: Option<u32>) {
        self.blinks.push((count, period_ms));
    }
}

// ── MockLink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLink {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub fail_writes: bool,
}

/// One decoded element of the outbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Out {
    Ack,
    Nak,
    Blob(DecodedBlob),
    Text(String),
}

#[allow(dead_code)]
impl MockLink {
    pub fn send(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Split and clear everything written so far.
    pub fn drain(&mut self) -> Vec<Out> {
        let bytes = std::mem::take(&mut self.tx);
        let mut out = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                ACK => {
                    out.push(Out::Ack);
                    i += 1;
                }
                NAK => {
                    out.push(Out::Nak);
                    i += 1;
                }
                BLOB_FLAG => {
                    let mut raw = [0u8; BLOB_LEN];
                    raw.copy_from_slice(&bytes[i..i + BLOB_LEN]);
                    out.push(Out::Blob(blob::decode(&raw).expect("flag checked")));
                    i += BLOB_LEN;
                }
                b' ' => {
                    let end = bytes[i..]
                        .iter()
                        .position(|&b| b == b'\n')
                        .expect("text line terminated")
                        + i;
                    out.push(Out::Text(
                        String::from_utf8(bytes[i + 1..end].to_vec()).expect("utf-8 text"),
                    ));
                    i = end + 1;
                }
                other => panic!("unexpected byte 0x{other:02X} at {i}"),
            }
        }
        out
    }

    pub fn blobs(&mut self) -> Vec<DecodedBlob> {
        self.drain()
            .into_iter()
            .filter_map(|o| match o {
                Out::Blob(b) => Some(b),
                _ => None,
            })
            .collect()
    }
}

impl SerialLink for MockLink {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if self.fail_writes {
            return Err(LinkError::WriteFailed);
        }
        self.tx.extend_from_slice(bytes);
        Ok(())
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// Scheduler plus its collaborators, started and with the banner drained.
pub struct Rig {
    pub scheduler: Scheduler,
    pub board: MockBoard,
    pub link: MockLink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(ShieldConfig::default())
    }

    pub fn with_config(config: ShieldConfig) -> Self {
        let mut board = MockBoard::new();
        let mut link = MockLink::default();
        let mut scheduler = Scheduler::new(config, &mut board).expect("valid config");
        scheduler.start(&mut board, &mut link).expect("banner written");
        link.drain();
        Self {
            scheduler,
            board,
            link,
        }
    }

    pub fn tick(&mut self) -> TickReport {
        self.scheduler.tick(&mut self.board, &mut self.link)
    }

    /// Send `bytes`, run one tick, return what came back.
    pub fn command(&mut self, bytes: &[u8]) -> Vec<Out> {
        self.link.send(bytes);
        self.tick();
        self.link.drain()
    }

    /// Advance the clock by `us`, tick, and return the blobs produced.
    pub fn step(&mut self, us: u32) -> Vec<DecodedBlob> {
        self.board.advance_us(us);
        self.tick();
        self.link.blobs()
    }
}
