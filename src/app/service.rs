//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the fan actuator, the measurement history, every
//! heuristic instance and the disturber.  It exposes a clean,
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService           │
//!   RelayPort ◀── │ Heuristic · Disturber · Fan   │
//!                 └──────────────────────────────┘
//! ```
//!
//! One call to [`tick`](AppService::tick) is one cooperative cycle.  The
//! sensor is read at most once per `sample_interval_ms`; in between, the
//! actuator is still updated so that manual runs and mute windows take
//! effect without waiting for the next sample.

use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::disturber::Disturber;
use crate::error::{Error, SensorError};
use crate::fan::{FanActuator, FanState};
use crate::heuristics::{EvalContext, HeuristicKind, HeuristicSet};
use crate::history::{HISTORY_CAPACITY, Measurement, MeasurementStore};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ConfigPort, EventSink, Millis, RelayPort, SensorPort};

/// Unsaved config is flushed this long after the last change.
const AUTO_SAVE_DELAY_MS: Millis = 5_000;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<const N: usize = HISTORY_CAPACITY> {
    config: SystemConfig,
    fan: FanActuator,
    history: MeasurementStore<N>,
    heuristics: HeuristicSet,
    active: HeuristicKind,
    disturber: Disturber,

    /// Manual run deadline; the fan is demanded while `now < deadline`.
    run_until: Option<Millis>,

    // -- Sampling --
    last_sample_at: Option<Millis>,
    /// EMA state; `None` until the first good reading.
    smoothed: Option<f32>,
    last_humidity: Option<u8>,
    last_temperature: Option<f32>,

    // -- Stale-reading policy --
    failing_since: Option<Millis>,
    stale: bool,

    tick_count: u64,
    config_dirty: bool,
    dirty_since: Millis,
}

impl AppService {
    /// Construct the service with the default history capacity.
    pub fn new(config: SystemConfig) -> Self {
        Self::with_history_capacity(config)
    }
}

impl<const N: usize> AppService<N> {
    /// Construct the service with a history of `N` slots.
    pub fn with_history_capacity(config: SystemConfig) -> Self {
        let active = select_heuristic(config.selected_heuristic);
        Self {
            fan: FanActuator::new(&config),
            history: MeasurementStore::new(),
            heuristics: HeuristicSet::new(),
            active,
            disturber: Disturber::new(),
            run_until: None,
            last_sample_at: None,
            smoothed: None,
            last_humidity: None,
            last_temperature: None,
            failing_since: None,
            stale: false,
            tick_count: 0,
            config_dirty: false,
            dirty_since: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the service and force the relay into a known state.
    pub fn start(&mut self, hw: &mut impl RelayPort, sink: &mut impl EventSink) {
        hw.set_fan(false);
        sink.emit(&AppEvent::Started(self.active));
        info!(
            "AppService started: heuristic={} disturber={} history={} slots",
            self.active.name(),
            self.config.use_disturber,
            N
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one cycle: sample → heuristic → disturber → actuator → history.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`RelayPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        now: Millis,
        hw: &mut (impl SensorPort + RelayPort),
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        let sampled = if self.sample_due(now) {
            self.last_sample_at = Some(now);
            self.sample(now, hw, sink)
        } else {
            None
        };

        self.drive_fan(now, hw, sink);

        if let Some(humidity) = sampled {
            if self.history.record(now, humidity) {
                debug!("History: {}% at {} ms ({} stored)", humidity, now, self.history.len());
            }
        }
    }

    fn sample_due(&self, now: Millis) -> bool {
        self.last_sample_at.is_none_or(|last| {
            now.saturating_sub(last) >= Millis::from(self.config.sample_interval_ms)
        })
    }

    /// Read the sensor and feed the decision logic.  Returns the humidity
    /// used for this cycle, or `None` if the read failed.
    fn sample(
        &mut self,
        now: Millis,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
    ) -> Option<u8> {
        let raw = match hw.read_humidity() {
            Ok(raw) => raw,
            Err(e) => {
                self.on_read_failure(e, now, sink);
                return None;
            }
        };

        if self.stale {
            info!("Humidity sensor recovered at {} ms", now);
            sink.emit(&AppEvent::SensorRecovered);
        }
        self.stale = false;
        self.failing_since = None;

        match hw.read_temperature() {
            Ok(t) => self.last_temperature = Some(t),
            Err(e) => debug!("Temperature read failed: {}", e),
        }

        let humidity = self.smooth(raw);
        self.last_humidity = Some(humidity);
        self.decide(humidity, now, sink);
        Some(humidity)
    }

    /// `avg' = (1−η)·reading + η·avg`; the first reading seeds the average.
    fn smooth(&mut self, raw: u8) -> u8 {
        let eta = self.config.smoothing_factor;
        let reading = f32::from(raw);
        let avg = match self.smoothed {
            Some(avg) if eta > 0.0 => (1.0 - eta) * reading + eta * avg,
            _ => reading,
        };
        self.smoothed = Some(avg);
        avg.round().clamp(0.0, 100.0) as u8
    }

    fn decide(&mut self, humidity: u8, now: Millis, sink: &mut impl EventSink) {
        let ctx = EvalContext {
            humidity,
            now,
            config: &self.config,
            history: &self.history,
        };
        if let Some(requested) = self.heuristics.evaluate(self.active, &ctx) {
            self.fan.set_requested(requested);
        }

        if !self.config.use_disturber {
            self.disturber.reset();
        } else if self
            .disturber
            .evaluate(humidity, self.fan.requested(), now, &self.config)
        {
            self.fan.set_requested(true);
            sink.emit(&AppEvent::DisturberFired { humidity });
        }
    }

    /// Hold the last decision while reads fail; once failures outlast the
    /// stale limit, drop the request so the fan can wind down.
    fn on_read_failure(&mut self, err: SensorError, now: Millis, sink: &mut impl EventSink) {
        let since = *self.failing_since.get_or_insert(now);
        if self.stale {
            return;
        }
        warn!("Humidity read failed: {}", err);

        if now.saturating_sub(since) >= self.config.stale_reading_limit_ms() {
            self.stale = true;
            self.fan.set_requested(false);
            warn!(
                "Humidity reading stale since {} ms, clearing fan request",
                since
            );
            sink.emit(&AppEvent::SensorStale { since });
        }
    }

    fn drive_fan(&mut self, now: Millis, hw: &mut impl RelayPort, sink: &mut impl EventSink) {
        let manual = self.run_active(now);
        if !manual && self.run_until.take().is_some() {
            info!("Manual run finished at {} ms", now);
        }

        let demand = self.fan.requested() || manual;
        if self.fan.update(demand, now) {
            sink.emit(&AppEvent::FanSwitched {
                on: self.fan.is_running(),
                at: now,
            });
        }
        hw.set_fan(self.fan.is_running());
    }

    // ── Manual run ────────────────────────────────────────────

    /// Demand the fan for `secs` seconds from `now`.  Zero cancels.
    pub fn request_run_for(&mut self, secs: u32, now: Millis) {
        if secs == 0 {
            self.cancel_run();
            return;
        }
        let deadline = now + Millis::from(secs) * 1000;
        self.run_until = Some(deadline);
        info!("Manual run requested for {} s (until {} ms)", secs, deadline);
    }

    /// Drop any pending manual run.  The fan stays on until its mute-off
    /// window allows it to stop.
    pub fn cancel_run(&mut self) {
        if self.run_until.take().is_some() {
            info!("Manual run cancelled");
        }
    }

    fn run_active(&self, now: Millis) -> bool {
        self.run_until.is_some_and(|deadline| now < deadline)
    }

    // ── History API ───────────────────────────────────────────

    /// The newest `count` measurements, oldest first.
    pub fn recent_measurements(&self, count: usize) -> impl Iterator<Item = &Measurement> + '_ {
        self.history.recent(count)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        info!("Measurement history cleared");
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (network server, serial console).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: Millis,
        sink: &mut impl EventSink,
    ) -> crate::error::Result<()> {
        match cmd {
            AppCommand::RunFor(secs) => self.request_run_for(secs, now),
            AppCommand::CancelRun => self.cancel_run(),
            AppCommand::ClearHistory => self.clear_history(),
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate().map_err(|msg| {
                    warn!("Rejected config update: {}", msg);
                    Error::Config(msg)
                })?;
                self.apply_config(new_config, sink);
                self.mark_config_dirty(now);
                info!("Configuration updated at runtime");
            }
            AppCommand::SaveConfig => {
                self.mark_config_dirty(now);
                self.dirty_since = now.saturating_sub(AUTO_SAVE_DELAY_MS);
                info!("Explicit config save requested (will flush on next auto-save check)");
            }
        }
        Ok(())
    }

    fn apply_config(&mut self, config: SystemConfig, sink: &mut impl EventSink) {
        self.fan.set_mute_windows(&config);

        let kind = select_heuristic(config.selected_heuristic);
        if kind != self.active {
            info!("Heuristic {} -> {}", self.active.name(), kind.name());
            self.active = kind;
            sink.emit(&AppEvent::HeuristicSelected(kind));
        }
        self.config = config;
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot.
    pub fn build_telemetry(&self, now: Millis) -> TelemetryData {
        TelemetryData {
            uptime_ms: now,
            humidity: self.last_humidity,
            temperature_c: self.last_temperature,
            heuristic: self.active.name(),
            fan_requested: self.fan.requested(),
            fan_running: self.fan.is_running(),
            fan_run_time_ms: self.fan.run_time_ms(now),
            override_remaining_ms: self
                .run_until
                .map_or(0, |deadline| deadline.saturating_sub(now)),
            history_len: self.history.len(),
            sensor_stale: self.stale,
            disturber_fired: self.disturber.fired_count(),
        }
    }

    pub fn fan_state(&self) -> FanState {
        self.fan.state()
    }

    pub fn is_fan_running(&self) -> bool {
        self.fan.is_running()
    }

    pub fn active_heuristic(&self) -> HeuristicKind {
        self.active
    }

    pub fn last_humidity(&self) -> Option<u8> {
        self.last_humidity
    }

    pub fn is_sensor_stale(&self) -> bool {
        self.stale
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Total cycles executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Clone of the live configuration (for read-back or delta updates).
    pub fn current_config(&self) -> SystemConfig {
        self.config.clone()
    }

    // ── Config dirty-flag management ──────────────────────────

    fn mark_config_dirty(&mut self, now: Millis) {
        if !self.config_dirty {
            self.config_dirty = true;
            self.dirty_since = now;
        }
    }

    /// Save if the config has been dirty for at least five seconds.
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort, now: Millis) -> bool {
        if !self.config_dirty || now.saturating_sub(self.dirty_since) < AUTO_SAVE_DELAY_MS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config auto-saved");
                true
            }
            Err(e) => {
                warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Save immediately if dirty (call before shutdown).
    pub fn force_save_if_dirty(&mut self, storage: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                info!("Config force-saved before shutdown");
            }
            Err(e) => warn!("Config force-save failed: {}", e),
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}

/// Map a stored selection to a strategy, warning when it falls back.
fn select_heuristic(index: i32) -> HeuristicKind {
    let kind = HeuristicKind::from_index(index);
    if kind as i32 != index {
        warn!("Heuristic index {} out of range, using {}", index, kind.name());
    }
    kind
}
