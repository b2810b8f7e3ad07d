//! Shared state threaded through every dispatch handler.
//!
//! `ShieldContext` owns every channel and the sync epoch. It is the only
//! mutable state in the firmware; the scheduler owns the context and hands
//! it to handlers one command at a time.

use log::{info, warn};

use crate::app::ports::Board;
use crate::channels::analog::AnalogChannel;
use crate::channels::calibration::Sensor;
use crate::channels::digital::DigitalChannel;
use crate::config::ShieldConfig;
use crate::pins;
use crate::protocol::Source;

// ---------------------------------------------------------------------------
// Sync epoch
// ---------------------------------------------------------------------------

/// Process-wide time origin, reset only by `MDE_SYNC`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncEpoch {
    start_us: u32,
}

impl SyncEpoch {
    pub fn reset(&mut self, now_us: u32) {
        self.start_us = now_us;
    }

    /// Epoch start; 0 until the first sync.
    pub fn start_us(&self) -> u32 {
        self.start_us
    }

    pub fn elapsed(&self, now_us: u32) -> u32 {
        now_us.wrapping_sub(self.start_us)
    }
}

// ---------------------------------------------------------------------------
// ShieldContext
// ---------------------------------------------------------------------------

/// Index of each analog channel in [`ShieldContext::analog`] (poll order).
pub const ANA105: usize = 0;
pub const ANA205: usize = 1;
pub const ANA110: usize = 2;
pub const ANA210: usize = 3;

/// Index of each digital channel in [`ShieldContext::digital`].
pub const DIG1: usize = 0;
pub const DIG2: usize = 1;

pub struct ShieldContext {
    /// ANA105, ANA205, ANA110, ANA210.
    pub analog: [AnalogChannel; 4],
    /// DIG1, DIG2.
    pub digital: [DigitalChannel; 2],
    pub epoch: SyncEpoch,
    pub config: ShieldConfig,
}

impl ShieldContext {
    /// Build every channel at the configured defaults.
    pub fn new(config: ShieldConfig, board: &mut dyn Board) -> Self {
        let now = board.now_micros();
        let debounce = config.button_debounce_ms;

        let probe = |source, pin, sensor: Sensor, ten_volt| {
            let (name, short_name, calibration) = sensor.describe(ten_volt);
            AnalogChannel::new(source, pin, now)
                .with_sensor(name, short_name, calibration)
                .with_debounce_ms(debounce)
        };

        let mut analog = [
            probe(Source::Ana105, pins::BTA01_5V_GPIO, config.bta01_sensor, false),
            probe(Source::Ana205, pins::BTA02_5V_GPIO, config.bta02_sensor, false),
            probe(Source::Ana110, pins::BTA01_10V_GPIO, config.bta01_sensor, true),
            probe(Source::Ana210, pins::BTA02_10V_GPIO, config.bta02_sensor, true),
        ];
        for ch in &mut analog {
            if let Err(e) = ch.set_sample_rate(config.default_sample_rate, now) {
                warn!("{}: {e}, keeping 10 Hz", ch.source().label());
            }
            ch.set_stop_condition(config.default_stop_count);
        }

        let digital = [
            DigitalChannel::new(Source::Dig1, pins::BTD01_GPIO, board),
            DigitalChannel::new(Source::Dig2, pins::BTD02_GPIO, board),
        ];

        Self {
            analog,
            digital,
            epoch: SyncEpoch::default(),
            config,
        }
    }

    pub fn analog_mut(&mut self, source: Source) -> Option<&mut AnalogChannel> {
        self.analog.iter_mut().find(|ch| ch.source() == source)
    }

    pub fn digital_mut(&mut self, source: Source) -> Option<&mut DigitalChannel> {
        self.digital.iter_mut().find(|ch| ch.source() == source)
    }

    pub fn halt_all(&mut self) {
        self.analog.iter_mut().for_each(AnalogChannel::halt);
        self.digital.iter_mut().for_each(DigitalChannel::halt);
        info!("all channels halted");
    }

    /// Arm every channel whose bit is set in `mask`.
    pub fn arm_selected(&mut self, mask: u8) {
        for ch in &mut self.analog {
            if ch.source().selected_by(mask) {
                ch.arm();
            }
        }
        for ch in &mut self.digital {
            if ch.source().selected_by(mask) {
                ch.arm();
            }
        }
    }

    /// Reset the epoch to `now_us` and restart every channel clock from it.
    pub fn sync_all(&mut self, now_us: u32) {
        self.epoch.reset(now_us);
        let epoch = self.epoch.start_us();
        for ch in &mut self.analog {
            ch.sync(epoch, now_us);
        }
        for ch in &mut self.digital {
            ch.sync(epoch, now_us);
        }
        info!("clocks synchronised at {now_us} us");
    }
}
