//! Trend detection by least-squares regression over the measurement history.
//!
//! Two signals are combined:
//!
//! * the regression slope of humidity against elapsed time (percent per
//!   minute) over everything in the [`MeasurementStore`].  A steep rise means
//!   someone is showering.
//! * a short history of periodic minima.  After a peak the slope flattens
//!   while the air is still saturated; if humidity is still clearly above
//!   the oldest known minimum the fan keeps running.

use heapless::Deque;
use log::debug;

use crate::app::ports::Millis;
use crate::history::MeasurementStore;

/// How often the running minimum is archived.
const MIN_PERIOD_MS: Millis = 20 * 60 * 1000;

/// Number of archived minima kept.
const MAX_MINIMA: usize = 6;

/// Slope (%/min) above which humidity is considered rising.
const RISING_SLOPE: f64 = 0.45;

/// Upper bound of the "flat but positive" slope band.
const FLAT_SLOPE: f64 = 0.1;

/// Margin (%) over the oldest minimum that still counts as saturated air.
const ABOVE_MIN_MARGIN: i16 = 2;

const MS_PER_MINUTE: f64 = 60_000.0;

pub struct Linear {
    /// Lowest reading since the last archive; `u8::MAX` when reset.
    running_min: u8,
    minima: Deque<u8, MAX_MINIMA>,
    /// When the running minimum is next archived.  Set on first evaluation.
    next_archive_at: Option<Millis>,
}

impl Default for Linear {
    fn default() -> Self {
        Self::new()
    }
}

impl Linear {
    pub fn new() -> Self {
        Self {
            running_min: u8::MAX,
            minima: Deque::new(),
            next_archive_at: None,
        }
    }

    pub fn evaluate<const N: usize>(
        &mut self,
        humidity: u8,
        now: Millis,
        history: &MeasurementStore<N>,
    ) -> bool {
        self.track_minimum(humidity, now);

        let slope = regression_slope(history);
        let mut requested = slope > RISING_SLOPE;
        if !requested && slope > 0.0 && slope < FLAT_SLOPE {
            requested = self.is_above_min(humidity);
        }
        debug!("Linear: slope={:.3}%/min -> {}", slope, requested);
        requested
    }

    fn track_minimum(&mut self, humidity: u8, now: Millis) {
        self.running_min = self.running_min.min(humidity);

        match self.next_archive_at {
            None => self.next_archive_at = Some(now + MIN_PERIOD_MS),
            Some(due) if now >= due => {
                if self.minima.is_full() {
                    self.minima.pop_front();
                }
                let _ = self.minima.push_back(self.running_min);
                self.running_min = u8::MAX;
                self.next_archive_at = Some(now + MIN_PERIOD_MS);
            }
            Some(_) => {}
        }
    }

    fn is_above_min(&self, humidity: u8) -> bool {
        self.minima
            .front()
            .is_some_and(|&min| i16::from(humidity) - i16::from(min) > ABOVE_MIN_MARGIN)
    }

    /// Archived minima, oldest first.
    pub fn minima(&self) -> impl Iterator<Item = &u8> + '_ {
        self.minima.iter()
    }
}

/// Least-squares slope of humidity over elapsed minutes, using mean-centred
/// sums.  Zero when there are fewer than two points or no time spread.
pub fn regression_slope<const N: usize>(history: &MeasurementStore<N>) -> f64 {
    let Some(start) = history.first().map(|m| m.timestamp) else {
        return 0.0;
    };
    let n = history.len();
    if n < 2 {
        return 0.0;
    }

    let minutes = |t: Millis| (t - start) as f64 / MS_PER_MINUTE;
    let (sum_t, sum_h) = history.iter().fold((0.0, 0.0), |(st, sh), m| {
        (st + minutes(m.timestamp), sh + f64::from(m.humidity))
    });
    let mean_t = sum_t / n as f64;
    let mean_h = sum_h / n as f64;

    let (num, den) = history.iter().fold((0.0, 0.0), |(num, den), m| {
        let dt = minutes(m.timestamp) - mean_t;
        let dh = f64::from(m.humidity) - mean_h;
        (num + dt * dh, den + dt * dt)
    });

    if den <= f64::EPSILON { 0.0 } else { num / den }
}
