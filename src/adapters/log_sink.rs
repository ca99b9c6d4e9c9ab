//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART on the device, stderr through `tracing-subscriber` on
//! the host).  At debug level each telemetry record is also written as a
//! JSON line for scraping.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | RH={} | T={} | heuristic={} | fan={} (req={}) run={}s | \
                     manual={}s | history={} | stale={} | disturbed={}",
                    t.humidity.map_or_else(|| "--".into(), |h| format!("{h}%")),
                    t.temperature_c
                        .map_or_else(|| "--".into(), |c| format!("{c:.1}\u{00b0}C")),
                    t.heuristic,
                    if t.fan_running { "ON" } else { "OFF" },
                    t.fan_requested,
                    t.fan_run_time_ms / 1000,
                    t.override_remaining_ms / 1000,
                    t.history_len,
                    t.sensor_stale,
                    t.disturber_fired,
                );
                if log::log_enabled!(log::Level::Debug) {
                    match serde_json::to_string(t) {
                        Ok(json) => debug!("TELEM json {}", json),
                        Err(e) => warn!("Telemetry JSON encoding failed: {}", e),
                    }
                }
            }
            AppEvent::FanSwitched { on, at } => {
                info!("FAN | {} at {} ms", if *on { "ON" } else { "OFF" }, at);
            }
            AppEvent::HeuristicSelected(kind) => {
                info!("HEURISTIC | {}", kind.name());
            }
            AppEvent::DisturberFired { humidity } => {
                warn!("DISTURBER | forced fan on at {}%", humidity);
            }
            AppEvent::SensorStale { since } => {
                warn!("SENSOR | stale since {} ms", since);
            }
            AppEvent::SensorRecovered => {
                info!("SENSOR | recovered");
            }
            AppEvent::Started(kind) => {
                info!("START | heuristic={}", kind.name());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::TelemetryData;
    use crate::heuristics::HeuristicKind;

    fn telemetry() -> TelemetryData {
        TelemetryData {
            uptime_ms: 61_000,
            humidity: Some(64),
            temperature_c: None,
            heuristic: HeuristicKind::Linear.name(),
            fan_requested: true,
            fan_running: true,
            fan_run_time_ms: 12_000,
            override_remaining_ms: 0,
            history_len: 7,
            sensor_stale: false,
            disturber_fired: 2,
        }
    }

    #[test]
    fn telemetry_exports_as_json() {
        let json = serde_json::to_string(&telemetry()).unwrap();
        assert!(json.contains("\"humidity\":64"));
        assert!(json.contains("\"temperature_c\":null"));
        assert!(json.contains("\"heuristic\":\"Linear\""));
        assert!(json.contains("\"disturber_fired\":2"));
    }

    #[test]
    fn every_event_is_logged() {
        let mut sink = LogEventSink::new();
        for event in [
            AppEvent::Started(HeuristicKind::Limiter),
            AppEvent::FanSwitched { on: true, at: 5 },
            AppEvent::HeuristicSelected(HeuristicKind::Adaptive2),
            AppEvent::DisturberFired { humidity: 71 },
            AppEvent::SensorStale { since: 1_000 },
            AppEvent::SensorRecovered,
            AppEvent::Telemetry(telemetry()),
        ] {
            sink.emit(&event);
        }
    }
}
