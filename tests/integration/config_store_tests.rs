//! Integration tests for configuration persistence.
//!
//! Boot-time loading through the NVS adapter (simulation backend) and the
//! service's debounced auto-save through a mock config port.

use super::mock_hw::{LogSink, MockHardware, MockNvs};

use humifan::adapters::nvs::NvsAdapter;
use humifan::app::commands::AppCommand;
use humifan::app::ports::{ConfigError, ConfigPort};
use humifan::app::service::AppService;
use humifan::config::SystemConfig;
use humifan::heuristics::HeuristicKind;

#[test]
fn boot_uses_stored_heuristic_selection() {
    let nvs = NvsAdapter::new().unwrap();
    let stored = SystemConfig {
        selected_heuristic: HeuristicKind::Adaptive2 as i32,
        humidity_trigger: 68,
        ..SystemConfig::default()
    };
    nvs.save(&stored).unwrap();

    let app = AppService::new(nvs.load_or_default());
    assert_eq!(app.active_heuristic(), HeuristicKind::Adaptive2);
    assert_eq!(app.current_config().humidity_trigger, 68);
}

#[test]
fn fresh_store_boots_with_defaults() {
    let nvs = NvsAdapter::new().unwrap();
    let app = AppService::new(nvs.load_or_default());
    assert_eq!(app.current_config(), SystemConfig::default());
    assert_eq!(app.active_heuristic(), HeuristicKind::Limiter);
}

#[test]
fn runtime_update_is_persisted_after_debounce() {
    let mut app: AppService<16> = AppService::with_history_capacity(SystemConfig::default());
    let mut sink = LogSink::new();
    let nvs = MockNvs::new();

    let cfg = SystemConfig {
        mute_fan_off_secs: 120,
        ..SystemConfig::default()
    };
    app.handle_command(AppCommand::UpdateConfig(cfg.clone()), 1_000, &mut sink)
        .unwrap();

    // Ticking never saves on its own.
    let mut hw = MockHardware::scripted(&[50, 50, 50]);
    for t in [1_000, 2_000, 3_000] {
        app.tick(t, &mut hw, &mut sink);
        assert!(!app.auto_save_if_needed(&nvs, t));
    }
    assert_eq!(nvs.saves.get(), 0);

    assert!(app.auto_save_if_needed(&nvs, 6_000));
    assert_eq!(nvs.load(), Ok(cfg));
    assert!(!app.is_config_dirty());
}

#[test]
fn failed_save_keeps_config_dirty() {
    let mut app: AppService<16> = AppService::with_history_capacity(SystemConfig::default());
    let mut sink = LogSink::new();
    let nvs = MockNvs::new();
    nvs.fail_writes.set(true);

    app.handle_command(AppCommand::SaveConfig, 0, &mut sink).unwrap();
    assert!(!app.auto_save_if_needed(&nvs, 0));
    assert!(app.is_config_dirty());

    nvs.fail_writes.set(false);
    app.force_save_if_dirty(&nvs);
    assert!(!app.is_config_dirty());
    assert_eq!(nvs.saves.get(), 1);
}

#[test]
fn invalid_config_never_reaches_storage() {
    let nvs = MockNvs::with(SystemConfig {
        humidity_trigger: 75,
        ..SystemConfig::default()
    });
    let bad = SystemConfig {
        smoothing_factor: 1.5,
        ..SystemConfig::default()
    };
    assert!(matches!(nvs.save(&bad), Err(ConfigError::ValidationFailed(_))));
    assert_eq!(nvs.load().map(|c| c.humidity_trigger), Ok(75));
    assert_eq!(nvs.saves.get(), 0);
}
