//! System configuration parameters
//!
//! All tunable parameters for the fan controller.
//! Values are loaded once at boot through the [`ConfigPort`](crate::app::ports::ConfigPort)
//! and replaced at runtime by `AppCommand::UpdateConfig`.  The control
//! core only ever reads this struct.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Thresholds ---
    /// Relative humidity (%) above which the Limiter and Disturber consider the room wet
    pub humidity_trigger: u8,
    /// Samples per window for the Adaptive heuristics
    pub sample_window_size: u8,

    // --- Fan hysteresis ---
    /// A turn-on request is ignored for this long after the fan turned off (seconds)
    pub mute_fan_on_secs: u16,
    /// A turn-off request is ignored for this long after the fan turned on (seconds)
    pub mute_fan_off_secs: u16,

    // --- Heuristics ---
    /// Index of the active heuristic; out-of-range values fall back to 0
    pub selected_heuristic: i32,
    /// Run the Disturber watchdog alongside the selected heuristic
    pub use_disturber: bool,
    /// Seconds of elevated humidity with an idle fan before the Disturber fires
    pub disturber_trigger_secs: u16,
    /// Rise (%) over the remembered baseline that triggers LongMemory
    pub known_hum_diff_trigger: u8,
    /// Quiet seconds after which LongMemory adopts a new baseline
    pub time_to_forget_secs: u16,

    // --- Sampling ---
    /// Minimum time between two sensor reads (milliseconds)
    pub sample_interval_ms: u32,
    /// EMA weight of the previous average (0.0 = raw readings)
    pub smoothing_factor: f32,
    /// Seconds of failed reads before the reading is declared stale
    pub stale_reading_limit_secs: u16,

    // --- Reporting ---
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Thresholds
            humidity_trigger: 60,
            sample_window_size: 10,

            // Fan hysteresis
            mute_fan_on_secs: 10,
            mute_fan_off_secs: 30,

            // Heuristics
            selected_heuristic: 0,
            use_disturber: true,
            disturber_trigger_secs: 300,  // 5 min
            known_hum_diff_trigger: 5,
            time_to_forget_secs: 3600,    // 1 h

            // Sampling
            sample_interval_ms: 1000,     // 1 Hz
            smoothing_factor: 0.0,
            stale_reading_limit_secs: 60,

            // Reporting
            telemetry_interval_secs: 60,  // 1/min
        }
    }
}

impl SystemConfig {
    /// Mute-on window in milliseconds.
    pub fn mute_on_ms(&self) -> u64 {
        u64::from(self.mute_fan_on_secs) * 1000
    }

    /// Mute-off window in milliseconds.
    pub fn mute_off_ms(&self) -> u64 {
        u64::from(self.mute_fan_off_secs) * 1000
    }

    /// LongMemory forget period in milliseconds.
    pub fn time_to_forget_ms(&self) -> u64 {
        u64::from(self.time_to_forget_secs) * 1000
    }

    /// Stale-reading limit in milliseconds.
    pub fn stale_reading_limit_ms(&self) -> u64 {
        u64::from(self.stale_reading_limit_secs) * 1000
    }

    /// Range-check every field.
    ///
    /// An out-of-range `selected_heuristic` is not an error; it selects the
    /// Limiter at runtime.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(1..=99).contains(&self.humidity_trigger) {
            return Err("humidity_trigger must be 1–99");
        }
        if self.sample_window_size < 2 {
            return Err("sample_window_size must be at least 2");
        }
        if self.mute_fan_on_secs > 3600 || self.mute_fan_off_secs > 3600 {
            return Err("mute windows must be 0–3600 s");
        }
        if self.disturber_trigger_secs == 0 {
            return Err("disturber_trigger_secs must be at least 1");
        }
        if !(1..=50).contains(&self.known_hum_diff_trigger) {
            return Err("known_hum_diff_trigger must be 1–50");
        }
        if self.time_to_forget_secs == 0 {
            return Err("time_to_forget_secs must be at least 1");
        }
        if !(100..=60_000).contains(&self.sample_interval_ms) {
            return Err("sample_interval_ms must be 100–60000");
        }
        if !(0.0..1.0).contains(&self.smoothing_factor) {
            return Err("smoothing_factor must be in [0.0, 1.0)");
        }
        if self.stale_reading_limit_secs > 3600 {
            return Err("stale_reading_limit_secs must be 0–3600");
        }
        if !(5..=3600).contains(&self.telemetry_interval_secs) {
            return Err("telemetry_interval_secs must be 5–3600");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.humidity_trigger > 0 && c.humidity_trigger < 100);
        assert!(c.sample_window_size >= 2);
        assert!(c.disturber_trigger_secs > 0);
        assert!(c.sample_interval_ms > 0);
        assert!((0.0..1.0).contains(&c.smoothing_factor));
        assert_eq!(c.selected_heuristic, 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.mute_fan_off_secs >= c.mute_fan_on_secs,
            "minimal run time should not be shorter than the restart lockout"
        );
        assert!(
            u64::from(c.sample_interval_ms) < u64::from(c.telemetry_interval_secs) * 1000,
            "sampling should be faster than telemetry"
        );
    }

    #[test]
    fn millisecond_helpers_scale_seconds() {
        let c = SystemConfig {
            mute_fan_on_secs: 3,
            mute_fan_off_secs: 7,
            time_to_forget_secs: 2,
            stale_reading_limit_secs: 5,
            ..SystemConfig::default()
        };
        assert_eq!(c.mute_on_ms(), 3000);
        assert_eq!(c.mute_off_ms(), 7000);
        assert_eq!(c.time_to_forget_ms(), 2000);
        assert_eq!(c.stale_reading_limit_ms(), 5000);
    }

    #[test]
    fn default_config_passes_validation() {
        assert_eq!(SystemConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_out_of_range_fields() {
        let bad = [
            SystemConfig { humidity_trigger: 0, ..SystemConfig::default() },
            SystemConfig { humidity_trigger: 100, ..SystemConfig::default() },
            SystemConfig { sample_window_size: 1, ..SystemConfig::default() },
            SystemConfig { disturber_trigger_secs: 0, ..SystemConfig::default() },
            SystemConfig { smoothing_factor: 1.0, ..SystemConfig::default() },
            SystemConfig { smoothing_factor: f32::NAN, ..SystemConfig::default() },
            SystemConfig { sample_interval_ms: 10, ..SystemConfig::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "accepted {:?}", cfg);
        }
    }

    #[test]
    fn out_of_range_heuristic_index_is_valid() {
        let cfg = SystemConfig { selected_heuristic: -3, ..SystemConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.humidity_trigger, c2.humidity_trigger);
        assert_eq!(c.selected_heuristic, c2.selected_heuristic);
        assert!((c.smoothing_factor - c2.smoothing_factor).abs() < 0.001);
    }
}
