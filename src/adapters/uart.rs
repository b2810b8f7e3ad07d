//! Host serial link over the ESP-IDF UART driver.
//!
//! Inbound bytes are pulled from the driver's ring buffer without blocking
//! and staged in a bounded queue; the scheduler takes them one at a time.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::uart::UartDriver;
use heapless::Deque;
use log::warn;

use crate::app::ports::SerialLink;
use crate::error::LinkError;

/// Staged inbound bytes.
pub const RX_QUEUE_LEN: usize = 256;

const RX_CHUNK: usize = 64;

pub struct UartLink<'d> {
    uart: UartDriver<'d>,
    rx: Deque<u8, RX_QUEUE_LEN>,
}

impl<'d> UartLink<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self {
            uart,
            rx: Deque::new(),
        }
    }

    /// Move whatever the driver has buffered into the staging queue.
    fn refill(&mut self) {
        let mut chunk = [0u8; RX_CHUNK];
        let room = RX_CHUNK.min(RX_QUEUE_LEN - self.rx.len());
        if room == 0 {
            return;
        }
        match self.uart.read(&mut chunk[..room], NON_BLOCK) {
            Ok(n) => {
                for &b in &chunk[..n] {
                    // Room was reserved above.
                    let _ = self.rx.push_back(b);
                }
            }
            Err(e) => warn!("uart: read failed ({e})"),
        }
    }
}

impl SerialLink for UartLink<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.rx.is_empty() {
            self.refill();
        }
        self.rx.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let mut written = 0;
        while written < bytes.len() {
            match self.uart.write(&bytes[written..]) {
                Ok(0) => {
                    return Err(LinkError::ShortWrite {
                        written,
                        expected: bytes.len(),
                    });
                }
                Ok(n) => written += n,
                Err(_) => return Err(LinkError::WriteFailed),
            }
        }
        Ok(())
    }
}
