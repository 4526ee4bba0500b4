//! Behavior profiles.
//!
//! Every profile runs the same skeleton from its `think`:
//!
//! 1. return early when the agent is gone
//! 2. hand over to an installed override
//! 3. sense
//! 4. power step ([`handle_procedural_power`](crate::picker::handle_procedural_power))
//! 5. movement, unless the power step used the turn
//!
//! Profiles differ in the shape of steps 3 to 5 and in the power hooks
//! below. [`ProfilePrototype`] dispatches to the per-variant impls.

pub mod common;

mod ally;
mod enrage_timer;
mod flanker;
mod flee;
mod hide_and_shoot;
mod melee;
mod multishot;
mod phase_boss;
mod ranged;
mod scavenger;
mod stationary;
mod wander;
mod weapon_swap;

pub use enrage_timer::EnrageState;
pub use hide_and_shoot::HideState;
pub use scavenger::ScavengerState;
pub use weapon_swap::WeaponState;

use ai_core::prototypes::{ProfileBase, UsePowerContext};
use ai_core::{PowerRef, ProfilePrototype};

use crate::contexts::{Status, UsePower};
use crate::picker::PowerPicker;
use crate::procedural::ProceduralAi;
use crate::think::ThinkContext;

pub trait Profile {
    fn base(&self) -> &ProfileBase;

    /// Runs once, on the agent's first think.
    fn init(&self, _ai: &mut ProceduralAi, _ctx: &mut ThinkContext<'_>) {}

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>);

    /// Fills the picker for one power step. Defaults to the base powers.
    fn populate_power_picker<'p>(&'p self, _ctx: &ThinkContext<'_>, picker: &mut PowerPicker<'p>) {
        for power in &self.base().powers {
            picker.add(power);
        }
    }

    /// Context a running power belongs to. Profiles with powers outside
    /// the base list extend the lookup.
    fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        self.base().power_context(power)
    }

    /// Drives one power context. Profiles may reinterpret the result.
    fn handle_power_entry(
        &self,
        ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        power: &UsePowerContext,
    ) -> Status {
        ai.handle_context(ctx, &UsePower::new(power))
    }

    fn on_power_picked(
        &self,
        _ai: &mut ProceduralAi,
        _ctx: &mut ThinkContext<'_>,
        _power: &UsePowerContext,
    ) {
    }

    /// A picked power was activated (`Running` or `Completed`).
    fn on_power_started(
        &self,
        _ai: &mut ProceduralAi,
        _ctx: &mut ThinkContext<'_>,
        _power: &UsePowerContext,
        _status: Status,
    ) {
    }

    /// A power use finished (`Completed` or `Failed`).
    fn on_power_ended(
        &self,
        _ai: &mut ProceduralAi,
        _ctx: &mut ThinkContext<'_>,
        _power: &UsePowerContext,
        _status: Status,
    ) {
    }
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            ProfilePrototype::Melee($p) => $body,
            ProfilePrototype::Ranged($p) => $body,
            ProfilePrototype::Flanker($p) => $body,
            ProfilePrototype::Stationary($p) => $body,
            ProfilePrototype::Wander($p) => $body,
            ProfilePrototype::Flee($p) => $body,
            ProfilePrototype::Ally($p) => $body,
            ProfilePrototype::EnrageTimer($p) => $body,
            ProfilePrototype::PhaseBoss($p) => $body,
            ProfilePrototype::Multishot($p) => $body,
            ProfilePrototype::WeaponSwap($p) => $body,
            ProfilePrototype::HideAndShoot($p) => $body,
            ProfilePrototype::Scavenger($p) => $body,
        }
    };
}

impl Profile for ProfilePrototype {
    fn base(&self) -> &ProfileBase {
        ProfilePrototype::base(self)
    }

    fn init(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        common::schedule_initial_cooldowns(ctx, &self.power_contexts());
        dispatch!(self, p => p.init(ai, ctx))
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        dispatch!(self, p => p.think(ai, ctx))
    }

    fn populate_power_picker<'p>(&'p self, ctx: &ThinkContext<'_>, picker: &mut PowerPicker<'p>) {
        dispatch!(self, p => p.populate_power_picker(ctx, picker))
    }

    fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        dispatch!(self, p => p.power_context(power))
    }

    fn handle_power_entry(
        &self,
        ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        power: &UsePowerContext,
    ) -> Status {
        dispatch!(self, p => p.handle_power_entry(ai, ctx, power))
    }

    fn on_power_picked(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>, power: &UsePowerContext) {
        dispatch!(self, p => p.on_power_picked(ai, ctx, power))
    }

    fn on_power_started(
        &self,
        ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        power: &UsePowerContext,
        status: Status,
    ) {
        dispatch!(self, p => p.on_power_started(ai, ctx, power, status))
    }

    fn on_power_ended(
        &self,
        ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        power: &UsePowerContext,
        status: Status,
    ) {
        dispatch!(self, p => p.on_power_ended(ai, ctx, power, status))
    }
}
