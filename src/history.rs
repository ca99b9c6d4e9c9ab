//! Bounded measurement history.
//!
//! A fixed-capacity ring of [`Measurement`]s in ascending timestamp order.
//! A sample is only appended when its humidity differs from the newest
//! stored entry, so long flat stretches cost a single slot.  When the ring
//! is full the oldest entry is evicted first.
//!
//! The default capacity is derived from a 10 KiB memory budget.  The
//! orchestrator is the only writer; the network side reads or clears it
//! through [`AppService`](crate::app::service::AppService).

use heapless::Deque;
use serde::{Deserialize, Serialize};

use crate::app::ports::Millis;

/// Memory budget reserved for the history ring.
const HISTORY_BUDGET_BYTES: usize = 10 * 1024;

/// Default number of history slots.
pub const HISTORY_CAPACITY: usize = HISTORY_BUDGET_BYTES / core::mem::size_of::<Measurement>();

/// One stored humidity sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    /// Monotonic milliseconds since boot.
    pub timestamp: Millis,
    /// Relative humidity in whole percent.
    pub humidity: u8,
}

/// Append-only, change-only humidity history with fixed capacity `N`.
pub struct MeasurementStore<const N: usize = HISTORY_CAPACITY> {
    ring: Deque<Measurement, N>,
}

impl<const N: usize> Default for MeasurementStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MeasurementStore<N> {
    pub const fn new() -> Self {
        Self { ring: Deque::new() }
    }

    /// Store a sample unless it repeats the newest entry.
    ///
    /// Returns `true` if the sample was appended.
    pub fn record(&mut self, timestamp: Millis, humidity: u8) -> bool {
        if N == 0 {
            return false;
        }
        if self.ring.back().is_some_and(|last| last.humidity == humidity) {
            return false;
        }
        if self.ring.is_full() {
            self.ring.pop_front();
        }
        // Cannot fail: a slot was freed above if the ring was full.
        let _ = self.ring.push_back(Measurement { timestamp, humidity });
        true
    }

    /// The newest `k` entries, oldest first.
    ///
    /// Asking for more than are stored yields everything.  Call again to
    /// restart the sequence.
    pub fn recent(&self, k: usize) -> impl Iterator<Item = &Measurement> + '_ {
        let skip = self.ring.len().saturating_sub(k);
        self.ring.iter().skip(skip)
    }

    /// Every stored entry, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> + '_ {
        self.ring.iter()
    }

    /// The oldest stored entry.
    pub fn first(&self) -> Option<&Measurement> {
        self.ring.front()
    }

    /// The newest stored entry.
    pub fn last(&self) -> Option<&Measurement> {
        self.ring.back()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.ring.clear();
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn never_exceeds_capacity_and_skips_repeats(
            values in proptest::collection::vec(0u8..=100, 0..200),
        ) {
            let mut store: MeasurementStore<16> = MeasurementStore::new();
            let mut prev: Option<u8> = None;
            for (i, h) in values.iter().enumerate() {
                let stored = store.record(i as Millis, *h);
                if prev == Some(*h) {
                    prop_assert!(!stored, "repeat of {} must not be stored", h);
                }
                if stored {
                    prev = Some(*h);
                }
                prop_assert!(store.len() <= 16);
            }

            // Timestamps stay ascending and neighbours always differ.
            let entries: Vec<Measurement> = store.iter().copied().collect();
            for pair in entries.windows(2) {
                prop_assert!(pair[0].timestamp < pair[1].timestamp);
                prop_assert_ne!(pair[0].humidity, pair[1].humidity);
            }
        }
    }
}
