//! Function-pointer finite state machine engine for the fan relay.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  StateTable                                   │
//! │  ┌─────────┬───────────┬──────────────────┐   │
//! │  │ StateId │ on_enter  │ on_update        │   │
//! │  ├─────────┼───────────┼──────────────────┤   │
//! │  │ Off     │ fn(ctx)   │ fn(ctx)->Option<>│   │
//! │  │ On      │ fn(ctx)   │ fn(ctx)->Option<>│   │
//! │  └─────────┴───────────┴──────────────────┘   │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine updates the current pointer
//! and runs `on_enter` for the next state.  All functions receive `&mut FanContext`.
//!
//! The initial state's `on_enter` is deliberately not run: a fan that has
//! never switched has no mute window to honour.

pub mod context;
pub mod states;

use context::FanContext;
use log::debug;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Physical fan states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Off = 0,
    On = 1,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `StateId`.  Anything unknown maps to `Off`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            1 => Self::On,
            0 => Self::Off,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Off
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.
pub type StateActionFn = fn(&mut FanContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FanContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Number of transitions taken since construction.
    transitions: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// Returns the new state if a transition happened.
    pub fn tick(&mut self, ctx: &mut FanContext) -> Option<StateId> {
        let next = (self.table[self.current].on_update)(ctx)?;
        if next as usize == self.current {
            return None;
        }
        self.transition(next, ctx);
        Some(next)
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Human-readable name of the current state.
    pub fn current_name(&self) -> &'static str {
        self.table[self.current].name
    }

    /// Transitions taken since construction.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut FanContext) {
        let next_idx = next_id as usize;

        debug!(
            "Fan FSM transition: {} -> {} at {} ms",
            self.table[self.current].name, self.table[next_idx].name, ctx.now
        );

        self.current = next_idx;
        self.transitions += 1;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
