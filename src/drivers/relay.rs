//! Fan relay driver.
//!
//! A single digital output switching the exhaust fan through a relay or
//! transistor stage.  Generic over `embedded-hal`'s `OutputPin`, so it runs
//! on an `esp-idf-hal` `PinDriver` and on host test doubles alike.
//!
//! This driver is a dumb actuator: anti-chatter timing is enforced upstream
//! by the fan actuator's mute windows.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::error::RelayError;

/// Electrical polarity of the relay input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pin high energises the relay.
    ActiveHigh,
    /// Pin low energises the relay (common on opto-isolated boards).
    ActiveLow,
}

pub struct FanRelay<P> {
    pin: P,
    polarity: Polarity,
    on: bool,
}

impl<P: OutputPin> FanRelay<P> {
    /// Take the pin and drive it to the "off" level.
    pub fn new(pin: P, polarity: Polarity) -> Result<Self, RelayError> {
        let mut relay = Self {
            pin,
            polarity,
            on: true,
        };
        relay.set(false)?;
        Ok(relay)
    }

    pub fn set(&mut self, on: bool) -> Result<(), RelayError> {
        if on == self.on {
            return Ok(());
        }
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| {
            warn!("Fan relay GPIO write failed: {:?}", e);
            RelayError::GpioWriteFailed
        })?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// Stand-in output for host builds: records the level and logs edges.
#[derive(Debug, Default)]
pub struct SimulatedPin {
    high: bool,
}

impl SimulatedPin {
    pub fn is_set_high(&self) -> bool {
        self.high
    }
}

impl embedded_hal::digital::ErrorType for SimulatedPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimulatedPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        log::debug!("Relay pin -> low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        log::debug!("Relay pin -> high");
        Ok(())
    }
}
