//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the humidity sensor driver and the fan relay, exposing them
//! through [`SensorPort`] and [`RelayPort`].  This is the only module in
//! the system that touches actual hardware.  On host builds it is
//! assembled from the simulated sensor and pin.

use embedded_hal::digital::OutputPin;

use crate::app::ports::{RelayPort, SensorPort};
use crate::drivers::relay::FanRelay;
use crate::error::SensorError;
use crate::sensors::HumiditySensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S, P> {
    sensor: S,
    relay: FanRelay<P>,
}

impl<S: HumiditySensor, P: OutputPin> HardwareAdapter<S, P> {
    pub fn new(sensor: S, relay: FanRelay<P>) -> Self {
        Self { sensor, relay }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S: HumiditySensor, P: OutputPin> SensorPort for HardwareAdapter<S, P> {
    fn read_humidity(&mut self) -> Result<u8, SensorError> {
        let rh = self.sensor.humidity()?;
        if !rh.is_finite() {
            return Err(SensorError::OutOfRange);
        }
        Ok(rh.round().clamp(0.0, 100.0) as u8)
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let t = self.sensor.temperature()?;
        if !(-40.0..=125.0).contains(&t) {
            return Err(SensorError::OutOfRange);
        }
        Ok(t)
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl<S: HumiditySensor, P: OutputPin> RelayPort for HardwareAdapter<S, P> {
    fn set_fan(&mut self, on: bool) {
        // The driver already logged the failure; the next cycle retries.
        let _ = self.relay.set(on);
    }

    fn is_fan_on(&self) -> bool {
        self.relay.is_on()
    }
}
