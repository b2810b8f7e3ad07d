//! Fuzz target: `Scheduler::tick`
//!
//! Treats the input as the host side of the serial link. The first byte of
//! every pair becomes a clock step so triggers, rate changes and stop counts
//! are exercised against a moving clock as well as against the framer.
//!
//! cargo fuzz run fuzz_command_stream

#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use labshield::app::ports::{Board, SerialLink};
use labshield::config::ShieldConfig;
use labshield::error::LinkError;
use labshield::scheduler::Scheduler;

struct Board8 {
    now: u32,
    noise: u8,
}

impl Board for Board8 {
    fn read_digital(&mut self, pin: u8) -> bool {
        self.noise.rotate_left(u32::from(pin)) & 1 == 1
    }

    fn read_analog(&mut self, pin: u8) -> u16 {
        u16::from(self.noise ^ pin) << 2
    }

    fn now_micros(&self) -> u32 {
        self.now
    }
}

#[derive(Default)]
struct Link {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl SerialLink for Link {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.tx.extend_from_slice(bytes);
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let mut board = Board8 { now: 0xFFFF_0000, noise: 0 };
    let mut link = Link::default();
    let Ok(mut scheduler) = Scheduler::new(ShieldConfig::default(), &mut board) else {
        return;
    };

    for pair in data.chunks(2) {
        board.now = board.now.wrapping_add(u32::from(pair[0]) * 97);
        board.noise = pair[0];
        if let Some(&b) = pair.get(1) {
            link.rx.push_back(b);
        }
        let report = scheduler.tick(&mut board, &mut link);
        assert_eq!(report.link_errors, 0);
    }

    // Every complete or invalid command was answered inside its tick.
    assert!(!scheduler.framer().is_complete());
    assert!(!scheduler.framer().is_invalid());
});
