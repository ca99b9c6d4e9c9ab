//! Sensirion SHT21 humidity / temperature sensor (I2C, address 0x40).
//!
//! Uses the "no hold master" measurement commands: trigger, wait for the
//! conversion, then read two data bytes plus a CRC-8.  The bus and the
//! delay are plain `embedded-hal` 1.0 traits, so the same driver runs on
//! `esp-idf-hal`'s `I2cDriver` and on a test double.
//!
//! ## Conversions (datasheet §6)
//!
//! * RH = −6 + 125 · S / 2¹⁶
//! * T  = −46.85 + 175.72 · S / 2¹⁶
//!
//! The two low bits of S are status bits and are cleared first.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use log::{info, warn};

use super::HumiditySensor;
use crate::error::SensorError;

pub const SHT21_ADDRESS: u8 = 0x40;

const TRIGGER_TEMP_MEASURE_NOHOLD: u8 = 0xF3;
const TRIGGER_HUMD_MEASURE_NOHOLD: u8 = 0xF5;
const USER_REGISTER_WRITE: u8 = 0xE6;
const USER_REGISTER_READ: u8 = 0xE7;
const HEATER_OFF_MASK: u8 = 0xFB;

/// Worst-case 14-bit conversion is 85 ms.
const MEASURE_DELAY_MS: u32 = 100;

/// CRC-8 generator x⁸ + x⁵ + x⁴ + 1.
const CRC_POLY: u8 = 0x31;

pub struct Sht21<I2C, D> {
    i2c: I2C,
    delay: D,
}

impl<I2C: I2c, D: DelayNs> Sht21<I2C, D> {
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self { i2c, delay }
    }

    /// Switch the on-chip heater off.  Call once after power-up.
    pub fn init(&mut self) -> Result<(), SensorError> {
        let mut reg = [0u8; 1];
        self.i2c
            .write_read(SHT21_ADDRESS, &[USER_REGISTER_READ], &mut reg)
            .map_err(bus_error)?;
        self.i2c
            .write(SHT21_ADDRESS, &[USER_REGISTER_WRITE, reg[0] & HEATER_OFF_MASK])
            .map_err(bus_error)?;
        info!("SHT21: initialised, user register 0x{:02X}", reg[0]);
        Ok(())
    }

    /// Relative humidity (%), clamped to 0–100.
    pub fn read_humidity(&mut self) -> Result<f32, SensorError> {
        let raw = self.measure(TRIGGER_HUMD_MEASURE_NOHOLD)?;
        Ok(raw_to_humidity(raw))
    }

    /// Temperature (°C).
    pub fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let raw = self.measure(TRIGGER_TEMP_MEASURE_NOHOLD)?;
        Ok(raw_to_celsius(raw))
    }

    fn measure(&mut self, command: u8) -> Result<u16, SensorError> {
        self.i2c
            .write(SHT21_ADDRESS, &[command])
            .map_err(bus_error)?;
        self.delay.delay_ms(MEASURE_DELAY_MS);

        let mut buf = [0u8; 3];
        self.i2c.read(SHT21_ADDRESS, &mut buf).map_err(bus_error)?;

        if crc8(&buf[..2]) != buf[2] {
            warn!("SHT21: CRC mismatch for {:02X?}", buf);
            return Err(SensorError::ChecksumMismatch);
        }
        Ok(u16::from_be_bytes([buf[0], buf[1]]) & !0x0003)
    }
}

impl<I2C: I2c, D: DelayNs> HumiditySensor for Sht21<I2C, D> {
    fn humidity(&mut self) -> Result<f32, SensorError> {
        self.read_humidity()
    }

    fn temperature(&mut self) -> Result<f32, SensorError> {
        self.read_temperature()
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> SensorError {
    warn!("SHT21: I2C error {:?}", e.kind());
    SensorError::BusFailed
}

/// Sensirion CRC-8 (init 0x00, no reflection).
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |mut crc, &byte| {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLY
            } else {
                crc << 1
            };
        }
        crc
    })
}

pub fn raw_to_humidity(raw: u16) -> f32 {
    let rh = -6.0 + 125.0 * f32::from(raw & !0x0003) / 65536.0;
    rh.clamp(0.0, 100.0)
}

pub fn raw_to_celsius(raw: u16) -> f32 {
    -46.85 + 175.72 * f32::from(raw & !0x0003) / 65536.0
}
