//! Long-memory baseline filter.
//!
//! Remembers a reference humidity and requests ventilation while the room is
//! more than `known_hum_diff_trigger` points above it.  The reference is
//! only replaced after `time_to_forget_secs` without a trigger, so a single
//! transient spike cannot drag it upwards.

use log::debug;

use crate::app::ports::Millis;
use crate::config::SystemConfig;

#[derive(Debug, Default)]
pub struct LongMemory {
    baseline: Option<u8>,
    /// Start of the current trigger-free stretch.
    quiet_since: Millis,
}

impl LongMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, humidity: u8, now: Millis, config: &SystemConfig) -> bool {
        let Some(baseline) = self.baseline else {
            self.remember(humidity, now);
            return false;
        };

        let rise = i16::from(humidity) - i16::from(baseline);
        if rise > i16::from(config.known_hum_diff_trigger) {
            self.quiet_since = now;
            return true;
        }

        if now.saturating_sub(self.quiet_since) >= config.time_to_forget_ms() {
            self.remember(humidity, now);
        }
        false
    }

    fn remember(&mut self, humidity: u8, now: Millis) {
        debug!("LongMemory: baseline {:?} -> {}", self.baseline, humidity);
        self.baseline = Some(humidity);
        self.quiet_since = now;
    }

    /// The remembered reference humidity.
    pub fn baseline(&self) -> Option<u8> {
        self.baseline
    }
}
