//! Context handlers: the primitive behaviors a profile composes.
//!
//! Each handler is a tiny state machine driven by the procedural runtime:
//!
//! ```text
//! validate ──► start ──► update ... update ──► end(Completed | Failed)
//!                 └──────────────────────────► end(Interrupted)   (replaced)
//! ```
//!
//! Handler structs borrow their immutable prototype for one call; anything
//! that must survive between calls is written to the agent's blackboard.
//! Ending only needs the [`ContextKind`], so a context can be interrupted
//! after its prototype is no longer at hand.

mod delay;
mod despawn;
mod flank;
mod flee;
mod interact;
mod move_to;
mod orbit;
mod rotate;
mod status;
mod teleport;
mod trigger_spawners;
mod use_affix_power;
mod use_power;
mod wander;

pub use delay::Delay;
pub use despawn::Despawn;
pub use flank::Flank;
pub use flee::Flee;
pub use interact::Interact;
pub use move_to::{MoveTo, reset_target_and_state_if_path_fails};
pub use orbit::Orbit;
pub use rotate::Rotate;
pub use status::Status;
pub use teleport::Teleport;
pub use trigger_spawners::TriggerSpawners;
pub use use_affix_power::UseAffixPower;
pub use use_power::UsePower;
pub use wander::Wander;

use crate::think::ThinkContext;

/// Kind tag of a context. Two contexts are "the same state" when their
/// kinds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum ContextKind {
    MoveTo,
    Orbit,
    Flank,
    Flee,
    Wander,
    Rotate,
    Delay,
    UsePower,
    UseAffixPower,
    Despawn,
    Teleport,
    TriggerSpawners,
    Interact,
}

impl ContextKind {
    pub const fn is_power(self) -> bool {
        matches!(self, ContextKind::UsePower | ContextKind::UseAffixPower)
    }

    /// Cleanup shared by every context of this kind.
    pub fn end(self, ctx: &mut ThinkContext<'_>, status: Status) {
        tracing::trace!(agent = %ctx.agent, kind = %self, %status, "context ended");
        match self {
            ContextKind::MoveTo => move_to::end(ctx, status),
            ContextKind::Orbit => orbit::end(ctx, status),
            ContextKind::Flank => flank::end(ctx, status),
            ContextKind::Flee => flee::end(ctx, status),
            ContextKind::Wander => wander::end(ctx, status),
            ContextKind::Rotate => rotate::end(ctx, status),
            ContextKind::Delay => delay::end(ctx, status),
            ContextKind::UsePower => use_power::end(ctx, status),
            ContextKind::UseAffixPower => use_affix_power::end(ctx, status),
            ContextKind::Despawn
            | ContextKind::Teleport
            | ContextKind::TriggerSpawners
            | ContextKind::Interact => {}
        }
    }
}

/// A parameterized primitive behavior.
pub trait ContextHandler {
    fn kind(&self) -> ContextKind;

    /// Whether the context may start now. A failed validation leaves the
    /// current state untouched.
    fn validate(&self, _ctx: &mut ThinkContext<'_>) -> bool {
        true
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status;

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status;

    /// Called when `start`/`update` finished the context. Defaults to the
    /// kind's shared cleanup.
    fn end(&self, ctx: &mut ThinkContext<'_>, status: Status) {
        self.kind().end(ctx, status);
    }
}
