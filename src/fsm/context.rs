//! Shared mutable context threaded through every fan FSM handler.
//!
//! `FanContext` is the single struct that state handlers read from and
//! write to: the demand for this tick, the current time, the mute windows,
//! and the timestamps of the last transitions.

use crate::app::ports::Millis;

/// The context passed to every fan state handler.
#[derive(Debug, Clone)]
pub struct FanContext {
    // -- Input for this tick --
    /// Whether the fan should run (heuristic request OR manual override).
    pub demand: bool,
    /// Monotonic time of this tick.
    pub now: Millis,

    // -- Hysteresis --
    /// A turn-on is refused until this long after the last turn-off.
    pub mute_on_ms: Millis,
    /// A turn-off is refused until this long after the last turn-on.
    pub mute_off_ms: Millis,

    // -- Transition history --
    /// `None` until the fan has turned on once.
    pub last_turn_on: Option<Millis>,
    /// `None` until the fan has turned off once.
    pub last_turn_off: Option<Millis>,
}

impl FanContext {
    pub fn new(mute_on_ms: Millis, mute_off_ms: Millis) -> Self {
        Self {
            demand: false,
            now: 0,
            mute_on_ms,
            mute_off_ms,
            last_turn_on: None,
            last_turn_off: None,
        }
    }

    /// Whether the mute-on window since the last turn-off has expired.
    pub fn may_turn_on(&self) -> bool {
        self.last_turn_off
            .is_none_or(|off| self.now.saturating_sub(off) >= self.mute_on_ms)
    }

    /// Whether the mute-off window since the last turn-on has expired.
    pub fn may_turn_off(&self) -> bool {
        self.last_turn_on
            .is_none_or(|on| self.now.saturating_sub(on) >= self.mute_off_ms)
    }
}
