//! Board adapter: assembles the [`Board`] port from `embedded-hal` pins
//! and the narrower ports.
//!
//! Digital inputs are looked up by GPIO number. A pin that is not wired
//! or fails to read is logged and reported low.

use embedded_hal::digital::{Error as _, InputPin};
use heapless::Vec;
use log::warn;

use crate::app::ports::{AnalogReader, Board, Indicator, MicrosClock};
use crate::error::SensorError;

/// Digital inputs: two BTD ports plus the button, with headroom.
pub const MAX_INPUTS: usize = 4;

pub struct GpioBoard<P, A, C, I>
where
    P: InputPin,
    A: AnalogReader,
    C: MicrosClock,
    I: Indicator,
{
    inputs: Vec<(u8, P), MAX_INPUTS>,
    adc: A,
    clock: C,
    indicator: I,
}

impl<P, A, C, I> GpioBoard<P, A, C, I>
where
    P: InputPin,
    A: AnalogReader,
    C: MicrosClock,
    I: Indicator,
{
    pub fn new(adc: A, clock: C, indicator: I) -> Self {
        Self {
            inputs: Vec::new(),
            adc,
            clock,
            indicator,
        }
    }

    /// Register a digital input under its GPIO number.
    pub fn with_input(mut self, gpio: u8, pin: P) -> Result<Self, SensorError> {
        self.inputs
            .push((gpio, pin))
            .map_err(|(gpio, _)| SensorError::UnmappedPin(gpio))?;
        Ok(self)
    }

    /// Advance the LED pattern. Call once per main-loop pass.
    pub fn service(&mut self) {
        self.indicator.update(self.clock.now_millis());
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}

impl<P, A, C, I> Board for GpioBoard<P, A, C, I>
where
    P: InputPin,
    A: AnalogReader,
    C: MicrosClock,
    I: Indicator,
{
    fn read_digital(&mut self, pin: u8) -> bool {
        let Some((_, input)) = self.inputs.iter_mut().find(|(gpio, _)| *gpio == pin) else {
            warn!("gpio_board: {}", SensorError::UnmappedPin(pin));
            return false;
        };
        match input.is_high() {
            Ok(level) => level,
            Err(e) => {
                warn!("gpio_board: GPIO{pin}: {} ({:?})", SensorError::GpioReadFailed, e.kind());
                false
            }
        }
    }

    fn read_analog(&mut self, pin: u8) -> u16 {
        match self.adc.read_raw(pin) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("gpio_board: GPIO{pin}: {e}");
                0
            }
        }
    }

    fn now_micros(&self) -> u32 {
        self.clock.now_micros()
    }

    fn blink(&mut self, count: u8, period_ms: Option<u32>) {
        self.indicator.blink(count, period_ms);
    }
}
