//! Disturber watchdog.
//!
//! Statistical heuristics can miss a slow, steady rise that never looks
//! like a "shift".  The disturber runs **every sampling cycle after the
//! selected heuristic** and counts consecutive evaluations in which the
//! room is above the humidity trigger while nothing requests the fan.
//!
//! ## Lifecycle
//!
//! 1. Humidity above trigger, fan not requested: the counter increments.
//! 2. Any other evaluation resets the counter to zero, as does a cycle in
//!    which the disturber is disabled.
//! 3. When the counter reaches `disturber_trigger_secs` the disturber
//!    fires once and the orchestrator asserts the fan request.
//! 4. The force does not reset the counter; it drops to zero on the next
//!    evaluation because the fan is now requested.
//!
//! One evaluation per sampling cycle at the default 1 Hz sample rate makes
//! the counter a count of seconds.

use log::warn;

use crate::app::ports::Millis;
use crate::config::SystemConfig;

#[derive(Debug, Default)]
pub struct Disturber {
    /// Consecutive evaluations over threshold with the fan idle.
    elevated_count: u32,
    /// Total number of times the disturber has fired.
    fired: u32,
}

impl Disturber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` on the single evaluation at which the fan must be forced on.
    pub fn evaluate(
        &mut self,
        humidity: u8,
        fan_requested: bool,
        now: Millis,
        config: &SystemConfig,
    ) -> bool {
        if fan_requested || humidity <= config.humidity_trigger {
            self.elevated_count = 0;
            return false;
        }

        self.elevated_count = self.elevated_count.saturating_add(1);
        if self.elevated_count != u32::from(config.disturber_trigger_secs) {
            return false;
        }

        self.fired = self.fired.saturating_add(1);
        warn!(
            "Disturber: humidity {}% above {}% for {} cycles with fan idle, forcing on at {} ms",
            humidity, config.humidity_trigger, self.elevated_count, now
        );
        true
    }

    /// Drop the elevated streak without firing.
    pub fn reset(&mut self) {
        self.elevated_count = 0;
    }

    /// Current consecutive-elevated count.
    pub fn elevated_count(&self) -> u32 {
        self.elevated_count
    }

    /// How often the disturber has fired since boot.
    pub fn fired_count(&self) -> u32 {
        self.fired
    }
}
