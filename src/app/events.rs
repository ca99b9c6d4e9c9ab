//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, refresh a display,
//! push over the network, etc.

use serde::Serialize;

use crate::app::ports::Millis;
use crate::heuristics::HeuristicKind;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started with this heuristic selected.
    Started(HeuristicKind),

    /// The fan relay physically switched.
    FanSwitched { on: bool, at: Millis },

    /// A different heuristic became active after a config change.
    HeuristicSelected(HeuristicKind),

    /// The disturber forced the fan request on.
    DisturberFired { humidity: u8 },

    /// Sensor reads have been failing for longer than the stale limit.
    SensorStale { since: Millis },

    /// A good reading arrived after the sensor was declared stale.
    SensorRecovered,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub uptime_ms: Millis,
    /// Last (possibly smoothed) humidity, if any reading succeeded yet.
    pub humidity: Option<u8>,
    pub temperature_c: Option<f32>,
    pub heuristic: &'static str,
    pub fan_requested: bool,
    pub fan_running: bool,
    /// How long the fan has been on in its current run.
    pub fan_run_time_ms: Millis,
    /// Remaining manual-run time, zero when none is active.
    pub override_remaining_ms: Millis,
    pub history_len: usize,
    pub sensor_stale: bool,
    /// Times the disturber has forced the fan on since boot.
    pub disturber_fired: u32,
}
