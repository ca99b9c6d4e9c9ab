//! Fuzz target: `AppService::tick` with arbitrary readings and commands
//!
//! Each input byte is either a humidity sample, a read failure or an
//! external command.  Time advances by a fuzz-chosen step.  Asserts that
//! the relay never chatters faster than the mute windows allow and that
//! the history stays bounded.
//!
//! cargo fuzz run fuzz_controller_cycle

#![no_main]

use humifan::app::commands::AppCommand;
use humifan::app::events::AppEvent;
use humifan::app::ports::{EventSink, RelayPort, SensorPort};
use humifan::app::service::AppService;
use humifan::config::SystemConfig;
use humifan::error::SensorError;
use libfuzzer_sys::fuzz_target;

const MUTE_ON_SECS: u16 = 3;
const MUTE_OFF_SECS: u16 = 5;

struct Hw {
    next: Option<Result<u8, SensorError>>,
    relay: bool,
}

impl SensorPort for Hw {
    fn read_humidity(&mut self) -> Result<u8, SensorError> {
        self.next.take().unwrap_or(Err(SensorError::Unavailable))
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(20.0)
    }
}

impl RelayPort for Hw {
    fn set_fan(&mut self, on: bool) {
        self.relay = on;
    }

    fn is_fan_on(&self) -> bool {
        self.relay
    }
}

#[derive(Default)]
struct Switches(Vec<(bool, u64)>);

impl EventSink for Switches {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::FanSwitched { on, at } = event {
            self.0.push((*on, *at));
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let config = SystemConfig {
        selected_heuristic: i32::from(selector % 6),
        mute_fan_on_secs: MUTE_ON_SECS,
        mute_fan_off_secs: MUTE_OFF_SECS,
        sample_window_size: 4,
        disturber_trigger_secs: 3,
        stale_reading_limit_secs: 2,
        ..SystemConfig::default()
    };
    let mut app: AppService<8> = AppService::with_history_capacity(config.clone());
    let mut hw = Hw { next: None, relay: false };
    let mut sink = Switches::default();
    let mut now = 0u64;

    for pair in rest.chunks(2) {
        let step = u64::from(pair.get(1).copied().unwrap_or(0) % 4) * 500;
        now += step;

        match pair[0] {
            b @ 0..=100 => hw.next = Some(Ok(b)),
            101..=120 => hw.next = Some(Err(SensorError::BusFailed)),
            121..=130 => {
                let _ = app.handle_command(AppCommand::RunFor(u32::from(pair[0] - 120)), now, &mut sink);
            }
            131..=140 => {
                let _ = app.handle_command(AppCommand::CancelRun, now, &mut sink);
            }
            141..=150 => {
                let _ = app.handle_command(AppCommand::ClearHistory, now, &mut sink);
            }
            b => {
                let cfg = SystemConfig {
                    selected_heuristic: i32::from(b % 7) - 1,
                    ..config.clone()
                };
                let _ = app.handle_command(AppCommand::UpdateConfig(cfg), now, &mut sink);
            }
        }

        app.tick(now, &mut hw, &mut sink);
        assert!(app.history_len() <= 8);
        assert_eq!(hw.is_fan_on(), app.is_fan_running());
    }

    for pair in sink.0.windows(2) {
        let ((_, prev_at), (on, at)) = (pair[0], pair[1]);
        let mute = if on { MUTE_ON_SECS } else { MUTE_OFF_SECS };
        assert!(at - prev_at >= u64::from(mute) * 1_000);
    }
});
