//! One-shot ADC adapter for the four BTA inputs.
//!
//! Configures ADC1 with raw ESP-IDF sys calls. Readings are taken at 12 bits
//! and scaled to the 10-bit range the host protocol expects.
//!
//! On host builds the adapter reports mid-scale (0 V) on every input.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::{error, info};

use crate::app::ports::AnalogReader;
use crate::error::{Error, SensorError};
use crate::pins;

/// The inputs this adapter configures.
pub const ANALOG_GPIOS: [u8; 4] = [
    pins::BTA01_5V_GPIO,
    pins::BTA01_10V_GPIO,
    pins::BTA02_5V_GPIO,
    pins::BTA02_10V_GPIO,
];

/// 12-bit conversion down to the protocol's 10 bits.
pub const fn to_ten_bit(raw12: u16) -> u16 {
    (raw12 >> 2) & pins::ADC_FULL_SCALE
}

fn check_mapped(pin: u8) -> Result<(), SensorError> {
    if ANALOG_GPIOS.contains(&pin) {
        Ok(())
    } else {
        Err(SensorError::UnmappedPin(pin))
    }
}

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct EspAdc {
    handle: adc_oneshot_unit_handle_t,
}

#[cfg(target_os = "espidf")]
impl EspAdc {
    /// Create the ADC1 unit and configure every BTA channel.
    pub fn new() -> Result<Self, Error> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: called once from main() before the tick loop starts.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            error!("esp_adc: unit init failed (rc={ret})");
            return Err(Error::Init("ADC1 unit"));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        for gpio in ANALOG_GPIOS {
            let channel = adc_channel_t::from(pins::adc1_channel(gpio));
            // SAFETY: handle was created above and is owned by this adapter.
            let ret = unsafe { adc_oneshot_config_channel(handle, channel, &chan_cfg) };
            if ret != ESP_OK as i32 {
                error!("esp_adc: GPIO{gpio} config failed (rc={ret})");
                return Err(Error::Init("ADC1 channel"));
            }
        }

        info!("esp_adc: ADC1 configured for {} inputs", ANALOG_GPIOS.len());
        Ok(Self { handle })
    }
}

#[cfg(target_os = "espidf")]
impl AnalogReader for EspAdc {
    fn read_raw(&mut self, pin: u8) -> Result<u16, SensorError> {
        check_mapped(pin)?;
        let channel = adc_channel_t::from(pins::adc1_channel(pin));
        let mut raw: i32 = 0;
        // SAFETY: handle is valid for the adapter's lifetime; single-threaded access.
        let ret = unsafe { adc_oneshot_read(self.handle, channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(SensorError::AdcReadFailed);
        }
        Ok(to_ten_bit(raw.max(0) as u16))
    }
}

#[cfg(target_os = "espidf")]
impl Drop for EspAdc {
    fn drop(&mut self) {
        // SAFETY: handle came from adc_oneshot_new_unit and is not used after this.
        unsafe {
            adc_oneshot_del_unit(self.handle);
        }
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct EspAdc {
    level: u16,
}

#[cfg(not(target_os = "espidf"))]
impl EspAdc {
    pub fn new() -> Result<Self, Error> {
        log::info!("esp_adc(sim): inputs read mid-scale");
        Ok(Self { level: 512 })
    }
}

#[cfg(not(target_os = "espidf"))]
impl AnalogReader for EspAdc {
    fn read_raw(&mut self, pin: u8) -> Result<u16, SensorError> {
        check_mapped(pin)?;
        Ok(self.level)
    }
}
