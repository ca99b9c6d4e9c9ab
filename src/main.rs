//! Humifan Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   MonotonicClock  │
//! │  (Sensor+Relay)    (EventSink)    (Config)     (ClockPort)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Heuristics · Disturber · Fan FSM · History            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On host builds the SHT21 and the relay are replaced by a simulated
//! bathroom and a logging pin.  A few environment variables steer the
//! simulation:
//!
//! - `HUMIFAN_SIM_HUMIDITY=<0..=100>` pins the simulated humidity.
//! - `HUMIFAN_RUN_FOR=<secs>` starts a manual run at boot.
//! - `HUMIFAN_RUN_SECS=<secs>` stops the loop after that long.

#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use humifan::adapters::hardware::HardwareAdapter;
use humifan::adapters::log_sink::LogEventSink;
use humifan::adapters::nvs::NvsAdapter;
use humifan::adapters::time::MonotonicClock;
use humifan::app::commands::AppCommand;
use humifan::app::events::AppEvent;
use humifan::app::ports::{ClockPort, EventSink, Millis};
use humifan::app::service::AppService;
use humifan::drivers::relay::{FanRelay, Polarity};
#[cfg(target_os = "espidf")]
use humifan::error::Error;

/// Polling period of the main loop.  Sampling is gated separately by
/// `sample_interval_ms`.
const LOOP_PERIOD_MS: u32 = 100;

// ── Hardware construction ─────────────────────────────────────

#[cfg(target_os = "espidf")]
type Hardware = HardwareAdapter<
    humifan::sensors::sht21::Sht21<esp_idf_hal::i2c::I2cDriver<'static>, esp_idf_hal::delay::FreeRtos>,
    esp_idf_hal::gpio::PinDriver<'static, esp_idf_hal::gpio::Gpio12, esp_idf_hal::gpio::Output>,
>;

#[cfg(not(target_os = "espidf"))]
type Hardware = HardwareAdapter<
    humifan::sensors::simulated::SimulatedSensor,
    humifan::drivers::relay::SimulatedPin,
>;

/// SHT21 on I2C0 (SDA 21, SCL 22); fan relay on GPIO 12, active high.
#[cfg(target_os = "espidf")]
fn build_hardware() -> Result<Hardware> {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::PinDriver;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::prelude::*;
    use humifan::sensors::sht21::Sht21;

    let peripherals = Peripherals::take().map_err(|_| Error::Init("peripherals already taken"))?;

    let i2c_config = I2cConfig::new().baudrate(100.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    )
    .map_err(|_| Error::Init("I2C0 driver"))?;

    let mut sensor = Sht21::new(i2c, FreeRtos);
    if let Err(e) = sensor.init() {
        // Reads will keep failing and the stale-reading policy takes over.
        warn!("SHT21 init failed: {}", e);
    }

    let pin = PinDriver::output(peripherals.pins.gpio12).map_err(|_| Error::Init("fan relay GPIO"))?;
    let relay = FanRelay::new(pin, Polarity::ActiveHigh).map_err(Error::from)?;

    Ok(HardwareAdapter::new(sensor, relay))
}

#[cfg(not(target_os = "espidf"))]
fn build_hardware() -> Result<Hardware> {
    use humifan::drivers::relay::SimulatedPin;
    use humifan::sensors::simulated::{SimulatedSensor, sim_set_humidity};

    if let Some(rh) = env_number::<u8>("HUMIFAN_SIM_HUMIDITY") {
        info!("Simulation: humidity pinned to {}%", rh);
        sim_set_humidity(Some(rh));
    }

    let relay = FanRelay::new(SimulatedPin::default(), Polarity::ActiveHigh)?;
    Ok(HardwareAdapter::new(SimulatedSensor::default(), relay))
}

#[cfg(not(target_os = "espidf"))]
fn env_number<T: core::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a number", name, raw);
            None
        }
    }
}

/// Host simulations may stop after `HUMIFAN_RUN_SECS`; the device never does.
#[cfg(not(target_os = "espidf"))]
fn run_limit_ms() -> Option<Millis> {
    env_number::<u64>("HUMIFAN_RUN_SECS").map(|s| s.saturating_mul(1000))
}

#[cfg(target_os = "espidf")]
fn run_limit_ms() -> Option<Millis> {
    None
}

fn init_logging() -> Result<()> {
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    #[cfg(not(target_os = "espidf"))]
    tracing_subscriber::fmt::init();

    Ok(())
}

fn sleep_ms(ms: u32) {
    #[cfg(target_os = "espidf")]
    esp_idf_hal::delay::FreeRtos::delay_ms(ms);

    #[cfg(not(target_os = "espidf"))]
    std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Humifan v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config (or defaults) ──────────────────────────
    let nvs = NvsAdapter::new().map_err(|e| {
        log::error!("NVS init failed: {}", e);
        e
    })?;
    let config = nvs.load_or_default();

    // ── 3. Construct adapters ─────────────────────────────────
    let mut hw = build_hardware()?;
    let mut log_sink = LogEventSink::new();
    let clock = MonotonicClock::new();

    // ── 4. Construct app service ──────────────────────────────
    let mut app = AppService::new(config);
    app.start(&mut hw, &mut log_sink);

    let run_limit_ms = run_limit_ms();

    #[cfg(not(target_os = "espidf"))]
    if let Some(secs) = env_number::<u32>("HUMIFAN_RUN_FOR") {
        app.handle_command(AppCommand::RunFor(secs), clock.now_ms(), &mut log_sink)?;
    }

    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    let mut last_telemetry: Millis = clock.now_ms();

    loop {
        let now = clock.now_ms();

        app.tick(now, &mut hw, &mut log_sink);

        let telemetry_every = Millis::from(app.current_config().telemetry_interval_secs) * 1000;
        if now.saturating_sub(last_telemetry) >= telemetry_every {
            last_telemetry = now;
            log_sink.emit(&AppEvent::Telemetry(app.build_telemetry(now)));
        }

        // Config auto-save (5s debounce after last change).
        app.auto_save_if_needed(&nvs, now);

        if run_limit_ms.is_some_and(|limit| now >= limit) {
            break;
        }

        sleep_ms(LOOP_PERIOD_MS);
    }

    // ── 6. Shutdown: release the fan, flush pending config ────
    app.handle_command(AppCommand::CancelRun, clock.now_ms(), &mut log_sink)?;
    app.tick(clock.now_ms(), &mut hw, &mut log_sink);
    app.force_save_if_dirty(&nvs);
    info!("Control loop stopped after {} ticks", app.tick_count());
    Ok(())
}
