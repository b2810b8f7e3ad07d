//! LabShield Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  UartLink        GpioBoard ── EspAdc · SystemClock · Blinker │
//! │  (SerialLink)    (Board)                                     │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  Scheduler (pure logic)                                │  │
//! │  │  CommandFramer · dispatch table · channels             │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, IOPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::info;

use labshield::adapters::esp_adc::EspAdc;
use labshield::adapters::gpio_board::GpioBoard;
use labshield::adapters::time::SystemClock;
use labshield::adapters::uart::UartLink;
use labshield::config::ShieldConfig;
use labshield::drivers::blinker::Blinker;
use labshield::pins;
use labshield::scheduler::Scheduler;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LabShield v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = ShieldConfig::default();
    let peripherals = Peripherals::take()?;

    // ── 2. Host link ──────────────────────────────────────────
    let uart_config = UartConfig::default().baudrate(Hertz(pins::UART_BAUD));
    let uart = UartDriver::new(
        peripherals.uart0,
        peripherals.pins.gpio43,
        peripherals.pins.gpio44,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let mut link = UartLink::new(uart);
    info!("UART0 at {} baud", pins::UART_BAUD);

    // ── 3. Board ──────────────────────────────────────────────
    let mut button = PinDriver::input(peripherals.pins.gpio0.downgrade())?;
    button.set_pull(Pull::Up)?;
    let btd01 = PinDriver::input(peripherals.pins.gpio11.downgrade())?;
    let btd02 = PinDriver::input(peripherals.pins.gpio12.downgrade())?;
    let led = PinDriver::output(peripherals.pins.gpio13)?;

    let mut board = GpioBoard::new(
        EspAdc::new()?,
        SystemClock::new(),
        Blinker::new(led, config.led_blink_period_ms),
    )
    .with_input(pins::BUTTON_GPIO, button)?
    .with_input(pins::BTD01_GPIO, btd01)?
    .with_input(pins::BTD02_GPIO, btd02)?;

    // ── 4. Scheduler ──────────────────────────────────────────
    let mut scheduler = Scheduler::new(config, &mut board)?;
    scheduler.start(&mut board, &mut link)?;
    info!("entering tick loop");

    loop {
        let report = scheduler.tick(&mut board, &mut link);
        board.service();
        if report.is_idle() {
            // Let the idle task feed the watchdog.
            FreeRtos::delay_ms(1);
        }
    }
}
