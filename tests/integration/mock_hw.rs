//! Mock hardware adapter for integration tests.
//!
//! Plays back a scripted sequence of humidity readings and records every
//! relay command so tests can assert on the full switching history
//! without touching real I2C/GPIO registers.

use humifan::app::events::AppEvent;
use humifan::app::ports::{ConfigError, ConfigPort, EventSink, RelayPort, SensorPort};
use humifan::config::SystemConfig;
use humifan::error::SensorError;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    readings: VecDeque<Result<u8, SensorError>>,
    /// Every `set_fan` call, in order.
    pub relay_calls: Vec<bool>,
    relay: bool,
    pub temperature: f32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            readings: VecDeque::new(),
            relay_calls: Vec::new(),
            relay: false,
            temperature: 22.0,
        }
    }

    /// Hardware that returns `readings` one per sample, then fails.
    pub fn scripted(readings: &[u8]) -> Self {
        let mut hw = Self::new();
        for &h in readings {
            hw.push_reading(h);
        }
        hw
    }

    pub fn push_reading(&mut self, humidity: u8) {
        self.readings.push_back(Ok(humidity));
    }

    pub fn push_failure(&mut self, err: SensorError) {
        self.readings.push_back(Err(err));
    }

    pub fn pending_readings(&self) -> usize {
        self.readings.len()
    }

    /// Number of off→on edges seen on the relay.
    pub fn switch_on_count(&self) -> usize {
        let mut prev = false;
        let mut count = 0;
        for &on in &self.relay_calls {
            if on && !prev {
                count += 1;
            }
            prev = on;
        }
        count
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_humidity(&mut self) -> Result<u8, SensorError> {
        self.readings
            .pop_front()
            .unwrap_or(Err(SensorError::Unavailable))
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.temperature)
    }
}

impl RelayPort for MockHardware {
    fn set_fan(&mut self, on: bool) {
        self.relay_calls.push(on);
        self.relay = on;
    }

    fn is_fan_on(&self) -> bool {
        self.relay
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Config store ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    pub stored: RefCell<Option<SystemConfig>>,
    pub saves: Cell<u32>,
    pub fail_writes: Cell<bool>,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(config: SystemConfig) -> Self {
        let nvs = Self::default();
        *nvs.stored.borrow_mut() = Some(config);
        nvs
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        Ok(self.stored.borrow().clone().unwrap_or_default())
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        if self.fail_writes.get() {
            return Err(ConfigError::IoError);
        }
        config.validate().map_err(ConfigError::ValidationFailed)?;
        *self.stored.borrow_mut() = Some(config.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
