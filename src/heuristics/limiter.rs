//! Plain threshold: run while humidity is above the configured trigger.

use crate::config::SystemConfig;

#[derive(Debug, Clone, Copy, Default)]
pub struct Limiter;

impl Limiter {
    pub fn evaluate(&self, humidity: u8, config: &SystemConfig) -> bool {
        humidity > config.humidity_trigger
    }
}
