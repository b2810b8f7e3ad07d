//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter      | Implements     | Connects to                    |
//! |--------------|----------------|--------------------------------|
//! | `gpio_board` | Board          | embedded-hal input pins + below|
//! | `esp_adc`    | AnalogReader   | ESP32 ADC1 one-shot            |
//! | `time`       | MicrosClock    | ESP32 high-resolution timer    |
//! | `uart`       | SerialLink     | ESP-IDF UART driver            |

pub mod esp_adc;
pub mod gpio_board;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
