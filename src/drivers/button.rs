//! Polled push-button release detector.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up on [`BUTTON_GPIO`]. The level is
//! sampled once per scheduler tick; nothing here waits on the pin.
//!
//! ## Detection
//!
//! ```text
//!   Idle ──pressed──▶ Debouncing{since} ──held ≥ window──▶ Held ──released──▶ Idle (fires)
//!          ▲                 │ released early
//!          └─────────────────┘
//! ```
//!
//! A press fires exactly once, on release, and only if it was held for at
//! least the debounce window.

use crate::app::ports::Board;
use crate::pins::BUTTON_GPIO;

/// Default hold time before a press counts.
pub const DEFAULT_DEBOUNCE_MS: u32 = 20;

/// Current button state, `true` while held down.
pub fn is_pressed(board: &mut dyn Board) -> bool {
    !board.read_digital(BUTTON_GPIO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressState {
    Idle,
    Debouncing { since_us: u32 },
    Held,
}

/// Times presses on the board's microsecond clock, so the wrapping
/// comparison below stays valid across the 32-bit rollover.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseDetector {
    state: PressState,
    debounce_us: u32,
}

impl ReleaseDetector {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            state: PressState::Idle,
            debounce_us: debounce_ms.saturating_mul(1_000),
        }
    }

    /// Feed the current level. Returns `true` once per completed press.
    pub fn update(&mut self, pressed: bool, now_us: u32) -> bool {
        match (self.state, pressed) {
            (PressState::Idle, true) => {
                self.state = PressState::Debouncing { since_us: now_us };
                false
            }
            (PressState::Idle, false) => false,

            (PressState::Debouncing { since_us }, true) => {
                if now_us.wrapping_sub(since_us) >= self.debounce_us {
                    self.state = PressState::Held;
                }
                false
            }
            // Bounce or a tap shorter than the window.
            (PressState::Debouncing { .. }, false) => {
                self.state = PressState::Idle;
                false
            }

            (PressState::Held, true) => false,
            (PressState::Held, false) => {
                self.state = PressState::Idle;
                true
            }
        }
    }

    /// Forget any press in progress.
    pub fn reset(&mut self) {
        self.state = PressState::Idle;
    }
}

impl Default for ReleaseDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}
