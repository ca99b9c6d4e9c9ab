//! Windowed statistical shift detection (Adaptive and Adaptive2).
//!
//! Samples are batched into a window of `sample_window_size` readings.  When
//! the window is complete its mean and sample standard deviation (N−1
//! denominator) are compared against the previous window's, then become the
//! new baseline and the window is cleared.  The decision therefore reacts to
//! a *change* in humidity, not to its absolute level.
//!
//! Until a window has completed the baseline is all zeroes, so the first
//! window decides against an empty room and normally requests the fan.

use heapless::Vec;
use log::debug;

use crate::config::SystemConfig;

/// Largest window the configuration can express.
const MAX_WINDOW: usize = u8::MAX as usize;

/// Standard deviations below this are treated as "no variance".
const MIN_STD_DEV: f32 = 0.1;

/// Fallback spread used when the baseline had no variance.
const FLAT_SPREAD_DIVISOR: f32 = 12.0;

/// Relative shift (%) that triggers the percentage test.
const PERCENT_TRIGGER: f32 = 3.0;

/// How a new window is compared with the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftTest {
    /// `|mean − base| > 2σ_base` (Adaptive).
    StdDev,
    /// `|100·base/mean − 100| > 3` (Adaptive2).
    Percent,
}

/// Mean and spread of one completed window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f32,
    pub std_dev: f32,
}

impl WindowStats {
    /// Baseline before any window has completed.
    pub const ZERO: Self = Self {
        mean: 0.0,
        std_dev: 0.0,
    };

    /// Mean and N−1 sample standard deviation.  Needs at least two samples.
    pub fn from_samples(samples: &[u8]) -> Option<Self> {
        if samples.len() < 2 {
            return None;
        }
        let n = samples.len() as f32;
        let mean = samples.iter().map(|&s| f32::from(s)).sum::<f32>() / n;
        let sq: f32 = samples
            .iter()
            .map(|&s| {
                let d = f32::from(s) - mean;
                d * d
            })
            .sum();
        Some(Self {
            mean,
            std_dev: (sq / (n - 1.0)).sqrt(),
        })
    }
}

pub struct Adaptive {
    test: ShiftTest,
    window: Vec<u8, MAX_WINDOW>,
    baseline: WindowStats,
}

impl Adaptive {
    pub fn new(test: ShiftTest) -> Self {
        Self {
            test,
            window: Vec::new(),
            baseline: WindowStats::ZERO,
        }
    }

    /// Add a sample; decide only when the window completes.
    pub fn evaluate(&mut self, humidity: u8, config: &SystemConfig) -> Option<bool> {
        let size = usize::from(config.sample_window_size).max(2);

        // A shrunk window size may leave the buffer already full.
        if self.window.push(humidity).is_err() || self.window.len() >= size {
            return self.complete_window();
        }
        None
    }

    fn complete_window(&mut self) -> Option<bool> {
        let stats = WindowStats::from_samples(&self.window);
        self.window.clear();
        let stats = stats?;

        let decision = self.shifted(self.baseline, stats);
        debug!(
            "Adaptive({:?}) window: mean={:.2} sd={:.2} -> {}",
            self.test, stats.mean, stats.std_dev, decision
        );
        self.baseline = stats;
        Some(decision)
    }

    fn shifted(&self, base: WindowStats, current: WindowStats) -> bool {
        match self.test {
            ShiftTest::StdDev => {
                let spread = if base.std_dev < MIN_STD_DEV {
                    base.mean / FLAT_SPREAD_DIVISOR
                } else {
                    base.std_dev
                };
                (current.mean - base.mean).abs() > 2.0 * spread
            }
            ShiftTest::Percent => {
                let mean = if current.mean.abs() < f32::EPSILON { 1.0 } else { current.mean };
                (100.0 * base.mean / mean - 100.0).abs() > PERCENT_TRIGGER
            }
        }
    }

    pub fn test(&self) -> ShiftTest {
        self.test
    }

    /// Samples collected towards the current window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Statistics of the last completed window, or [`WindowStats::ZERO`].
    pub fn baseline(&self) -> WindowStats {
        self.baseline
    }
}
