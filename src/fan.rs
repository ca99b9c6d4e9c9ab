//! Hysteresis-protected fan actuator.
//!
//! [`FanActuator`] is the sole owner of the fan's physical state.  Heuristics,
//! the disturber and the orchestrator only ever touch the *requested* flag via
//! [`set_requested`](FanActuator::set_requested); the physical state moves
//! only inside [`update`](FanActuator::update), through the [`Fsm`] and its
//! mute windows.  Driving the relay itself is the orchestrator's job.

use log::info;
use serde::Serialize;

use crate::app::ports::Millis;
use crate::config::SystemConfig;
use crate::fsm::context::FanContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

/// Point-in-time view of the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FanState {
    pub requested: bool,
    pub physical: bool,
    pub last_turn_on: Option<Millis>,
    pub last_turn_off: Option<Millis>,
}

pub struct FanActuator {
    fsm: Fsm,
    ctx: FanContext,
    requested: bool,
}

impl FanActuator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Off),
            ctx: FanContext::new(config.mute_on_ms(), config.mute_off_ms()),
            requested: false,
        }
    }

    /// Pick up new mute windows after a configuration change.
    /// Transition history is kept.
    pub fn set_mute_windows(&mut self, config: &SystemConfig) {
        self.ctx.mute_on_ms = config.mute_on_ms();
        self.ctx.mute_off_ms = config.mute_off_ms();
    }

    /// Record what the decision logic wants.  Takes effect on the next
    /// [`update`](Self::update).
    pub fn set_requested(&mut self, requested: bool) {
        self.requested = requested;
    }

    pub fn requested(&self) -> bool {
        self.requested
    }

    /// Evaluate the hysteresis rule for `demand` at `now`.
    ///
    /// Returns `true` if the physical state flipped.
    pub fn update(&mut self, demand: bool, now: Millis) -> bool {
        self.ctx.demand = demand;
        self.ctx.now = now;
        match self.fsm.tick(&mut self.ctx) {
            Some(state) => {
                info!("Fan switched {} at {} ms", self.fsm.current_name(), now);
                debug_assert_eq!(state, self.fsm.current_state());
                true
            }
            None => false,
        }
    }

    /// Physical state.
    pub fn is_running(&self) -> bool {
        self.fsm.current_state() == StateId::On
    }

    /// When the fan last turned on, if ever.
    pub fn turned_on_at(&self) -> Option<Millis> {
        self.ctx.last_turn_on
    }

    /// How long the fan has been running at `now` (zero when off).
    pub fn run_time_ms(&self, now: Millis) -> Millis {
        match (self.is_running(), self.ctx.last_turn_on) {
            (true, Some(on)) => now.saturating_sub(on),
            _ => 0,
        }
    }

    /// Number of physical switches since boot.
    pub fn switch_count(&self) -> u64 {
        self.fsm.transitions()
    }

    pub fn state(&self) -> FanState {
        FanState {
            requested: self.requested,
            physical: self.is_running(),
            last_turn_on: self.ctx.last_turn_on,
            last_turn_off: self.ctx.last_turn_off,
        }
    }
}
