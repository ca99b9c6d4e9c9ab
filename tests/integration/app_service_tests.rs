//! Integration tests for the AppService → heuristic → fan → relay pipeline.
//!
//! These run on the host (x86_64) and drive the service one sample per
//! simulated second, asserting on the relay commands seen by the mock
//! hardware.

use super::mock_hw::{LogSink, MockHardware};

use humifan::app::commands::AppCommand;
use humifan::app::events::AppEvent;
use humifan::app::ports::RelayPort;
use humifan::app::service::AppService;
use humifan::config::SystemConfig;
use humifan::error::SensorError;
use humifan::heuristics::HeuristicKind;

const SECOND: u64 = 1_000;

fn no_mute() -> SystemConfig {
    SystemConfig {
        humidity_trigger: 60,
        mute_fan_on_secs: 0,
        mute_fan_off_secs: 0,
        ..SystemConfig::default()
    }
}

fn make_app(config: SystemConfig) -> (AppService<64>, LogSink) {
    let app = AppService::with_history_capacity(config);
    (app, LogSink::new())
}

// ── Limiter end to end ────────────────────────────────────────

#[test]
fn limiter_follows_threshold_without_mute() {
    let (mut app, mut sink) = make_app(no_mute());
    let mut hw = MockHardware::scripted(&[55, 65, 70, 50]);
    app.start(&mut hw, &mut sink);

    let mut requested = Vec::new();
    let mut physical = Vec::new();
    for i in 0..4 {
        app.tick(i * SECOND, &mut hw, &mut sink);
        requested.push(app.fan_state().requested);
        physical.push(hw.is_fan_on());
    }

    assert_eq!(requested, vec![false, true, true, false]);
    assert_eq!(physical, vec![false, true, true, false]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::FanSwitched { .. })),
        2,
        "one switch on, one switch off"
    );
}

#[test]
fn start_releases_relay_and_announces_heuristic() {
    let (mut app, mut sink) = make_app(SystemConfig::default());
    let mut hw = MockHardware::new();
    app.start(&mut hw, &mut sink);

    assert_eq!(hw.relay_calls, vec![false]);
    assert_eq!(sink.events, vec![AppEvent::Started(HeuristicKind::Limiter)]);
}

// ── Hysteresis ────────────────────────────────────────────────

#[test]
fn mute_windows_suppress_chatter() {
    // Defaults: mute-on 10 s, mute-off 30 s.
    let (mut app, mut sink) = make_app(SystemConfig::default());
    let mut hw = MockHardware::new();

    for s in 0..60u64 {
        hw.push_reading(match s {
            0 => 70,
            1..35 => 50,
            _ => 70,
        });
        app.tick(s * SECOND, &mut hw, &mut sink);

        let expected = !(30..40).contains(&s);
        assert_eq!(app.is_fan_running(), expected, "at {s} s");
    }
    assert_eq!(hw.switch_on_count(), 2);
}

// ── Manual run ────────────────────────────────────────────────

#[test]
fn manual_run_overrides_dry_room_for_its_duration() {
    let (mut app, mut sink) = make_app(SystemConfig::default());
    let mut hw = MockHardware::new();

    app.handle_command(AppCommand::RunFor(30), 0, &mut sink).unwrap();
    for s in 0..40u64 {
        hw.push_reading(40);
        app.tick(s * SECOND, &mut hw, &mut sink);
        assert_eq!(app.is_fan_running(), s < 30, "at {s} s");
        assert!(!app.fan_state().requested);
    }
}

#[test]
fn cancelled_run_hands_control_back_to_heuristic() {
    let (mut app, mut sink) = make_app(no_mute());
    let mut hw = MockHardware::scripted(&[40, 40, 70]);

    app.handle_command(AppCommand::RunFor(600), 0, &mut sink).unwrap();
    app.tick(0, &mut hw, &mut sink);
    assert!(app.is_fan_running());

    app.handle_command(AppCommand::CancelRun, 500, &mut sink).unwrap();
    app.tick(SECOND, &mut hw, &mut sink);
    assert!(!app.is_fan_running());

    app.tick(2 * SECOND, &mut hw, &mut sink);
    assert!(app.is_fan_running(), "Limiter takes over at 70%");
}

// ── Heuristic switching ───────────────────────────────────────

#[test]
fn linear_requests_fan_on_steady_rise() {
    let config = SystemConfig {
        selected_heuristic: HeuristicKind::Linear as i32,
        use_disturber: false,
        ..no_mute()
    };
    let (mut app, mut sink) = make_app(config);
    let mut hw = MockHardware::scripted(&[40, 41, 42, 43]);

    // No slope until two measurements are stored.
    app.tick(0, &mut hw, &mut sink);
    app.tick(SECOND, &mut hw, &mut sink);
    assert!(!app.is_fan_running());

    // 1 %/s is 60 %/min, far above the rising threshold.
    app.tick(2 * SECOND, &mut hw, &mut sink);
    assert!(app.is_fan_running());
}

#[test]
fn runtime_switch_to_long_memory() {
    let (mut app, mut sink) = make_app(no_mute());
    let mut hw = MockHardware::scripted(&[50, 50, 54, 57]);

    let cfg = SystemConfig {
        selected_heuristic: HeuristicKind::LongMemory as i32,
        known_hum_diff_trigger: 5,
        ..no_mute()
    };
    app.handle_command(AppCommand::UpdateConfig(cfg), 0, &mut sink).unwrap();
    assert_eq!(app.active_heuristic(), HeuristicKind::LongMemory);
    assert!(
        sink.events
            .contains(&AppEvent::HeuristicSelected(HeuristicKind::LongMemory))
    );

    // Baseline 50; +4 is within the remembered range, +7 is not.
    for (i, expected) in [false, false, false, true].into_iter().enumerate() {
        app.tick(i as u64 * SECOND, &mut hw, &mut sink);
        assert_eq!(app.is_fan_running(), expected, "sample {i}");
    }
}

#[test]
fn out_of_range_selection_falls_back_to_limiter() {
    let (mut app, mut sink) = make_app(no_mute());
    let cfg = SystemConfig {
        selected_heuristic: 3,
        ..no_mute()
    };
    app.handle_command(AppCommand::UpdateConfig(cfg), 0, &mut sink).unwrap();
    assert_eq!(app.active_heuristic(), HeuristicKind::Linear);

    let cfg = SystemConfig {
        selected_heuristic: -4,
        ..no_mute()
    };
    app.handle_command(AppCommand::UpdateConfig(cfg), 0, &mut sink).unwrap();
    assert_eq!(app.active_heuristic(), HeuristicKind::Limiter);

    let mut hw = MockHardware::scripted(&[61]);
    app.tick(0, &mut hw, &mut sink);
    assert!(app.is_fan_running());
}

// ── Disturber ─────────────────────────────────────────────────

#[test]
fn disturber_rescues_an_undecided_adaptive() {
    let config = SystemConfig {
        selected_heuristic: HeuristicKind::Adaptive as i32,
        sample_window_size: 200,
        disturber_trigger_secs: 5,
        ..no_mute()
    };
    let (mut app, mut sink) = make_app(config);
    let mut hw = MockHardware::scripted(&[75; 5]);

    for s in 0..4u64 {
        app.tick(s * SECOND, &mut hw, &mut sink);
        assert!(!app.is_fan_running());
    }
    app.tick(4 * SECOND, &mut hw, &mut sink);
    assert!(app.is_fan_running());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::DisturberFired { humidity: 75 })),
        1
    );
}

// ── Sensor failure ────────────────────────────────────────────

#[test]
fn stale_sensor_keeps_manual_run_alive() {
    let config = SystemConfig {
        stale_reading_limit_secs: 1,
        ..no_mute()
    };
    let (mut app, mut sink) = make_app(config);
    let mut hw = MockHardware::scripted(&[80]);
    hw.push_failure(SensorError::BusFailed);
    hw.push_failure(SensorError::ChecksumMismatch);

    app.handle_command(AppCommand::RunFor(10), 0, &mut sink).unwrap();
    for s in 0..10u64 {
        app.tick(s * SECOND, &mut hw, &mut sink);
        assert!(app.is_fan_running(), "at {s} s");
    }
    assert!(app.is_sensor_stale());
    assert!(!app.fan_state().requested);
    assert!(sink.events.contains(&AppEvent::SensorStale { since: SECOND }));

    app.tick(10 * SECOND, &mut hw, &mut sink);
    assert!(!app.is_fan_running());
}

// ── History ───────────────────────────────────────────────────

#[test]
fn history_records_changes_and_clears_on_command() {
    let (mut app, mut sink) = make_app(no_mute());
    let mut hw = MockHardware::scripted(&[50, 50, 52, 52, 51]);
    for s in 0..5u64 {
        app.tick(s * SECOND, &mut hw, &mut sink);
    }

    let recent: Vec<(u64, u8)> = app
        .recent_measurements(2)
        .map(|m| (m.timestamp, m.humidity))
        .collect();
    assert_eq!(recent, vec![(2 * SECOND, 52), (4 * SECOND, 51)]);
    assert_eq!(app.history_len(), 3);

    app.handle_command(AppCommand::ClearHistory, 5 * SECOND, &mut sink)
        .unwrap();
    assert_eq!(app.history_len(), 0);
    assert_eq!(app.recent_measurements(5).count(), 0);
}

#[test]
fn history_evicts_oldest_when_full() {
    let mut app: AppService<4> = AppService::with_history_capacity(no_mute());
    let mut sink = LogSink::new();
    let mut hw = MockHardware::scripted(&[10, 20, 30, 40, 50, 60]);
    for s in 0..6u64 {
        app.tick(s * SECOND, &mut hw, &mut sink);
    }
    let stored: Vec<u8> = app.recent_measurements(10).map(|m| m.humidity).collect();
    assert_eq!(stored, vec![30, 40, 50, 60]);
}
