//! Humidity decision strategies.
//!
//! Five interchangeable strategies decide whether ventilation should run.
//! They form a closed set, so they are a sum type dispatched with `match`
//! rather than trait objects.  The orchestrator owns one instance of each in
//! a [`HeuristicSet`] for its whole lifetime; only the selected one is fed
//! each cycle, and the others keep their private state untouched until they
//! are selected again.
//!
//! A strategy returns `Some(request)` to set the fan's requested state, or
//! `None` to leave it as it is (e.g. while an Adaptive window is filling).

pub mod adaptive;
pub mod limiter;
pub mod linear;
pub mod long_memory;

use crate::app::ports::Millis;
use crate::config::SystemConfig;
use crate::history::MeasurementStore;

pub use adaptive::{Adaptive, ShiftTest};
pub use limiter::Limiter;
pub use linear::Linear;
pub use long_memory::LongMemory;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Index of each strategy in the configured `selected_heuristic` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HeuristicKind {
    Limiter = 0,
    Adaptive = 1,
    Adaptive2 = 2,
    Linear = 3,
    LongMemory = 4,
}

impl HeuristicKind {
    pub const COUNT: usize = 5;

    /// Map a configured index to a strategy.  Negative or out-of-range
    /// indices select the Limiter.
    pub fn from_index(idx: i32) -> Self {
        match idx {
            1 => Self::Adaptive,
            2 => Self::Adaptive2,
            3 => Self::Linear,
            4 => Self::LongMemory,
            _ => Self::Limiter,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Limiter => "Limiter",
            Self::Adaptive => "Adaptive",
            Self::Adaptive2 => "Adaptive2",
            Self::Linear => "Linear",
            Self::LongMemory => "LongMemory",
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation input
// ---------------------------------------------------------------------------

/// Everything a strategy may look at for one decision.
pub struct EvalContext<'a, const N: usize> {
    /// Current (possibly smoothed) humidity in percent.
    pub humidity: u8,
    pub now: Millis,
    pub config: &'a SystemConfig,
    pub history: &'a MeasurementStore<N>,
}

// ---------------------------------------------------------------------------
// Strategy sum type
// ---------------------------------------------------------------------------

pub enum Heuristic {
    Limiter(Limiter),
    /// Covers both Adaptive and Adaptive2; they differ only in [`ShiftTest`].
    Adaptive(Adaptive),
    Linear(Linear),
    LongMemory(LongMemory),
}

impl Heuristic {
    pub fn evaluate<const N: usize>(&mut self, ctx: &EvalContext<'_, N>) -> Option<bool> {
        match self {
            Self::Limiter(h) => Some(h.evaluate(ctx.humidity, ctx.config)),
            Self::Adaptive(h) => h.evaluate(ctx.humidity, ctx.config),
            Self::Linear(h) => Some(h.evaluate(ctx.humidity, ctx.now, ctx.history)),
            Self::LongMemory(h) => Some(h.evaluate(ctx.humidity, ctx.now, ctx.config)),
        }
    }
}

/// Build one instance of every strategy, indexed by [`HeuristicKind`].
pub fn build_heuristic_table() -> [Heuristic; HeuristicKind::COUNT] {
    [
        // Index 0 — Limiter
        Heuristic::Limiter(Limiter),
        // Index 1 — Adaptive
        Heuristic::Adaptive(Adaptive::new(ShiftTest::StdDev)),
        // Index 2 — Adaptive2
        Heuristic::Adaptive(Adaptive::new(ShiftTest::Percent)),
        // Index 3 — Linear
        Heuristic::Linear(Linear::new()),
        // Index 4 — LongMemory
        Heuristic::LongMemory(LongMemory::new()),
    ]
}

/// The orchestrator's fixed collection of strategy instances.
pub struct HeuristicSet {
    table: [Heuristic; HeuristicKind::COUNT],
}

impl Default for HeuristicSet {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicSet {
    pub fn new() -> Self {
        Self {
            table: build_heuristic_table(),
        }
    }

    /// Feed the reading to the strategy selected by `kind` only.
    pub fn evaluate<const N: usize>(
        &mut self,
        kind: HeuristicKind,
        ctx: &EvalContext<'_, N>,
    ) -> Option<bool> {
        self.table[kind as usize].evaluate(ctx)
    }
}
