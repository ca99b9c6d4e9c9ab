//! Sensor drivers.
//!
//! Every humidity source implements [`HumiditySensor`]; the
//! [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter) turns its
//! floating-point readings into the whole-percent values the domain uses.

pub mod sht21;
pub mod simulated;

use crate::error::SensorError;

/// A physical (or simulated) humidity/temperature sensor.
pub trait HumiditySensor {
    /// Relative humidity (%).
    fn humidity(&mut self) -> Result<f32, SensorError>;

    /// Temperature (°C).
    fn temperature(&mut self) -> Result<f32, SensorError>;
}
