//! Weapon swap: drop the weapon, fight unarmed for a while, then go back
//! for it.
//!
//! ```text
//! Armed ──(drop completed)──► Unarmed ──(timer)──► Seeking ──(arrived)──► PickingUp
//!   ▲                                                 │                      │
//!   └───────────────(weapon gone / pickup done)───────┴──────────────────────┘
//! ```
//!
//! State lives in `AICustomStateVal1`; the unarmed deadline in
//! `AICustomTimeVal1`.

use ai_core::prototypes::{EntityRegistration, ProfileBase, UsePowerContext, WeaponSwapProfile};
use ai_core::{PowerRef, PropertyKind};

use super::Profile;
use super::common::{begin_think, default_melee_movement};
use crate::contexts::{MoveTo, Status};
use crate::picker::{PowerPicker, handle_procedural_power, use_power_direct};
use crate::procedural::ProceduralAi;
use crate::selector::{register_selected_entity, select_entity};
use crate::senses::default_sensory;
use crate::think::ThinkContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum WeaponState {
    Armed,
    Unarmed,
    Seeking,
    PickingUp,
}

impl WeaponState {
    pub fn load(ctx: &ThinkContext<'_>) -> Self {
        match ctx.blackboard.get_int(PropertyKind::AICustomStateVal1) {
            1 => Self::Unarmed,
            2 => Self::Seeking,
            3 => Self::PickingUp,
            _ => Self::Armed,
        }
    }

    fn store(self, ctx: &mut ThinkContext<'_>) {
        tracing::debug!(agent = %ctx.agent, state = %self, "weapon state");
        ctx.blackboard
            .set_int(PropertyKind::AICustomStateVal1, self as i64);
    }
}

fn is_drop(profile: &WeaponSwapProfile, proto: &UsePowerContext) -> bool {
    profile
        .drop_weapon
        .as_ref()
        .is_some_and(|drop| drop.power.is_some() && drop.power == proto.power)
}

fn rearm(ctx: &mut ThinkContext<'_>) {
    ctx.blackboard.remove_kind(PropertyKind::AICustomTimeVal1);
    register_selected_entity(ctx, EntityRegistration::InteractEntity, None);
    WeaponState::Armed.store(ctx);
}

fn seek(profile: &WeaponSwapProfile, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
    let weapon = match ctx.blackboard_entity(PropertyKind::AIInteractEntityId) {
        Some(weapon) => Some(weapon),
        None => {
            let found = select_entity(ctx, &profile.weapon_select);
            register_selected_entity(ctx, EntityRegistration::InteractEntity, found);
            found
        }
    };
    if weapon.is_none() {
        tracing::debug!(agent = %ctx.agent, "weapon gone, rearming");
        rearm(ctx);
        return;
    }
    let last = ai.last_power_result();
    match ai.handle_context(ctx, &MoveTo::new(&profile.move_to_weapon, last)) {
        Status::Completed => WeaponState::PickingUp.store(ctx),
        Status::Failed => rearm(ctx),
        _ => {}
    }
}

fn pick_up(profile: &WeaponSwapProfile, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
    let Some(pickup) = &profile.pickup_weapon else {
        rearm(ctx);
        return;
    };
    if pickup.power.is_none() {
        tracing::warn!(agent = %ctx.agent, "pickup context has no power, rearming");
        rearm(ctx);
        return;
    }
    let status = use_power_direct(profile, ai, ctx, pickup);
    if !status.is_running() {
        rearm(ctx);
    }
}

impl Profile for WeaponSwapProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        default_sensory(ai, ctx, &self.base);

        match WeaponState::load(ctx) {
            WeaponState::Seeking => return seek(self, ai, ctx),
            WeaponState::PickingUp => return pick_up(self, ai, ctx),
            WeaponState::Unarmed
                if ctx.now >= ctx.blackboard.get_time(PropertyKind::AICustomTimeVal1) =>
            {
                WeaponState::Seeking.store(ctx);
                return seek(self, ai, ctx);
            }
            WeaponState::Armed | WeaponState::Unarmed => {}
        }

        if handle_procedural_power(self, ai, ctx).consumes_tick() {
            return;
        }
        default_melee_movement(ai, ctx, &self.base, &self.move_to, self.orbit.as_ref());
    }

    fn populate_power_picker<'p>(&'p self, ctx: &ThinkContext<'_>, picker: &mut PowerPicker<'p>) {
        match WeaponState::load(ctx) {
            WeaponState::Armed => {
                for power in &self.base.powers {
                    picker.add(power);
                }
                if let Some(drop) = &self.drop_weapon
                    && drop.power.is_some()
                {
                    picker.add(drop);
                }
            }
            WeaponState::Unarmed => {
                for power in &self.unarmed_powers {
                    picker.add(power);
                }
            }
            WeaponState::Seeking | WeaponState::PickingUp => {}
        }
    }

    fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        self.base
            .powers
            .iter()
            .chain(self.drop_weapon.iter())
            .chain(self.unarmed_powers.iter())
            .chain(self.pickup_weapon.iter())
            .find(|p| p.power == Some(power))
    }

    fn on_power_ended(
        &self,
        _ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        power: &UsePowerContext,
        status: Status,
    ) {
        if status.is_completed() && is_drop(self, power) && WeaponState::load(ctx) == WeaponState::Armed {
            let until = ctx.now.plus_millis(self.unarmed_duration_ms);
            ctx.blackboard.set_time(PropertyKind::AICustomTimeVal1, until);
            WeaponState::Unarmed.store(ctx);
        }
    }
}
