//! Simulated bathroom for host builds.
//!
//! Produces a repeating shower profile, one step per read: a dry baseline,
//! a steep rise while the shower runs, then an exponential decay back to
//! the baseline.  Tests and the host binary can pin the reading or inject
//! read failures through the lock-free `sim_*` hooks, mirroring the way
//! the hardware sensors are stubbed off-target.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use super::HumiditySensor;
use crate::error::SensorError;

/// `NO_OVERRIDE` means "follow the profile".
const NO_OVERRIDE: u8 = u8::MAX;

static SIM_HUMIDITY_OVERRIDE: AtomicU8 = AtomicU8::new(NO_OVERRIDE);
static SIM_READ_FAILURE: AtomicBool = AtomicBool::new(false);

/// Pin the simulated humidity to `value`, or `None` to resume the profile.
pub fn sim_set_humidity(value: Option<u8>) {
    SIM_HUMIDITY_OVERRIDE.store(value.map_or(NO_OVERRIDE, |v| v.min(100)), Ordering::Relaxed);
}

/// Make every read fail until cleared.
pub fn sim_fail_reads(fail: bool) {
    SIM_READ_FAILURE.store(fail, Ordering::Relaxed);
}

/// Shape of one simulated shower cycle, in reads.
#[derive(Debug, Clone, Copy)]
pub struct ShowerProfile {
    pub baseline: f32,
    pub peak: f32,
    /// Reads spent at the baseline before the shower starts.
    pub idle_steps: u32,
    /// Reads during which the shower runs.
    pub shower_steps: u32,
    /// Length of the whole cycle.
    pub period_steps: u32,
    /// Fraction of the excess humidity that remains after each decay step.
    pub decay: f32,
}

impl Default for ShowerProfile {
    fn default() -> Self {
        Self {
            baseline: 55.0,
            peak: 92.0,
            idle_steps: 120,
            shower_steps: 40,
            period_steps: 900,
            decay: 0.99,
        }
    }
}

pub struct SimulatedSensor {
    profile: ShowerProfile,
    step: u32,
    current: f32,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(ShowerProfile::default())
    }
}

impl SimulatedSensor {
    pub fn new(profile: ShowerProfile) -> Self {
        Self {
            current: profile.baseline,
            profile,
            step: 0,
        }
    }

    fn advance(&mut self) -> f32 {
        let p = &self.profile;
        let phase = self.step % p.period_steps.max(1);
        self.step = self.step.wrapping_add(1);

        self.current = if phase < p.idle_steps {
            p.baseline
        } else if phase < p.idle_steps + p.shower_steps {
            let rise = (p.peak - p.baseline) / p.shower_steps.max(1) as f32;
            (self.current + rise).min(p.peak)
        } else {
            p.baseline + (self.current - p.baseline) * p.decay
        };
        self.current
    }
}

impl HumiditySensor for SimulatedSensor {
    fn humidity(&mut self) -> Result<f32, SensorError> {
        if SIM_READ_FAILURE.load(Ordering::Relaxed) {
            return Err(SensorError::Unavailable);
        }
        let value = self.advance();
        match SIM_HUMIDITY_OVERRIDE.load(Ordering::Relaxed) {
            NO_OVERRIDE => Ok(value),
            pinned => Ok(f32::from(pinned)),
        }
    }

    fn temperature(&mut self) -> Result<f32, SensorError> {
        if SIM_READ_FAILURE.load(Ordering::Relaxed) {
            return Err(SensorError::Unavailable);
        }
        // Warm shower air: a degree or two above a 21 °C room.
        Ok(21.0 + (self.current - self.profile.baseline).max(0.0) / 20.0)
    }
}
