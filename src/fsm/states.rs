//! Concrete fan state handlers and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  OFF ──[demand ∧ mute-on expired]──▶ ON
//!   ▲                                   │
//!   └──[¬demand ∧ mute-off expired]─────┘
//! ```

use super::context::FanContext;
use super::{StateDescriptor, StateId};

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Off
        StateDescriptor {
            id: StateId::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_update: off_update,
        },
        // Index 1 — On
        StateDescriptor {
            id: StateId::On,
            name: "On",
            on_enter: Some(on_state_enter),
            on_update: on_state_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut FanContext) {
    ctx.last_turn_off = Some(ctx.now);
}

fn off_update(ctx: &mut FanContext) -> Option<StateId> {
    (ctx.demand && ctx.may_turn_on()).then_some(StateId::On)
}

// ═══════════════════════════════════════════════════════════════════════════
//  ON
// ═══════════════════════════════════════════════════════════════════════════

fn on_state_enter(ctx: &mut FanContext) {
    ctx.last_turn_on = Some(ctx.now);
}

fn on_state_update(ctx: &mut FanContext) -> Option<StateId> {
    (!ctx.demand && ctx.may_turn_off()).then_some(StateId::Off)
}
