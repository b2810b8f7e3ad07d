//! Non-blocking feedback LED blinker.
//!
//! `BLINKLED` only queues a pattern; [`Blinker::update`] advances it from the
//! tick loop, so a long blink sequence never stalls acquisition.
//!
//! ## Phases
//!
//! A blink of period `P` is `P/2` on followed by `P/2` off. `count` blinks
//! are `2 * count` phase edges; the LED always ends low.

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

use crate::app::ports::Indicator;

/// Feedback LED driven through any `embedded-hal` output pin.
pub struct Blinker<P: OutputPin> {
    pin: P,
    period_ms: u32,
    edges_left: u16,
    next_edge_ms: Option<u32>,
    lit: bool,
}

impl<P: OutputPin> Blinker<P> {
    pub fn new(pin: P, period_ms: u32) -> Self {
        Self {
            pin,
            period_ms: period_ms.max(2),
            edges_left: 0,
            next_edge_ms: None,
            lit: false,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn is_idle(&self) -> bool {
        self.edges_left == 0
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn drive(&mut self, on: bool) {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            warn!("blinker: LED write failed ({:?})", e.kind());
        }
        self.lit = on;
    }
}

impl<P: OutputPin> Indicator for Blinker<P> {
    fn blink(&mut self, count: u8, period_ms: Option<u32>) {
        if let Some(p) = period_ms.filter(|&p| p > 0) {
            self.period_ms = p.max(2);
        }
        self.edges_left = u16::from(count) * 2;
        self.next_edge_ms = None;
        if self.lit {
            self.drive(false);
        }
    }

    fn update(&mut self, now_ms: u32) {
        if self.edges_left == 0 {
            return;
        }
        let due = match self.next_edge_ms {
            None => true,
            Some(at) => now_ms.wrapping_sub(at) as i32 >= 0,
        };
        if !due {
            return;
        }
        let on = !self.lit;
        self.drive(on);
        self.edges_left -= 1;
        self.next_edge_ms = Some(now_ms.wrapping_add(self.period_ms / 2));
    }
}
