//! Hide and shoot: duck into cover, fire a fixed number of shots, come
//! out, recover, repeat.
//!
//! The cycle state lives in `AICustomStateVal1` and the shots fired so far
//! in `AIMultishotCount`. The shoot power's blackboard cooldown is lifted
//! between shots. A shot that fails for any reason other than a cooldown
//! still counts, so a target out of reach cannot pin the agent in cover;
//! losing the target ends the volley.

use ai_core::prototypes::{HideAndShootProfile, ProfileBase, UsePowerContext};
use ai_core::{PowerRef, PropertyKind};

use super::Profile;
use super::common::{begin_think, default_melee_movement};
use crate::contexts::{ContextKind, Delay, Status};
use crate::picker::{handle_procedural_power, use_power_direct};
use crate::procedural::ProceduralAi;
use crate::senses::default_sensory;
use crate::think::ThinkContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum HideState {
    Hide,
    Shooting,
    Unhide,
    Recover,
}

impl HideState {
    pub fn load(ctx: &ThinkContext<'_>) -> Self {
        match ctx.blackboard.get_int(PropertyKind::AICustomStateVal1) {
            1 => Self::Shooting,
            2 => Self::Unhide,
            3 => Self::Recover,
            _ => Self::Hide,
        }
    }

    fn store(self, ctx: &mut ThinkContext<'_>) {
        tracing::debug!(agent = %ctx.agent, state = %self, "hide state");
        ctx.blackboard
            .set_int(PropertyKind::AICustomStateVal1, self as i64);
    }
}

/// Whether the shoot power is only waiting on a cooldown. Such a shot is
/// retried instead of counted.
fn shot_cooling_down(profile: &HideAndShootProfile, ctx: &ThinkContext<'_>) -> bool {
    profile.shoot_power.power.is_some_and(|power| {
        ctx.now < ctx.blackboard.power_cooldown(power)
            || ctx.sim.cooldown_remaining(ctx.agent, power) > 0
    })
}

/// Returns `true` when the cycle used this think.
fn run_cycle(
    profile: &HideAndShootProfile,
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
) -> bool {
    match HideState::load(ctx) {
        HideState::Hide => {
            if ctx.live_target().is_none() {
                return false;
            }
            match use_power_direct(profile, ai, ctx, &profile.hide_power) {
                Status::Completed => {
                    HideState::Shooting.store(ctx);
                    true
                }
                Status::Running => true,
                _ => false,
            }
        }
        HideState::Shooting => {
            if ctx.live_target().is_none() {
                ctx.blackboard.remove_kind(PropertyKind::AIMultishotCount);
                HideState::Unhide.store(ctx);
                return true;
            }
            let status = use_power_direct(profile, ai, ctx, &profile.shoot_power);
            let counts = match status {
                Status::Completed => true,
                Status::Failed => !shot_cooling_down(profile, ctx),
                _ => false,
            };
            if counts {
                let shots = ctx.blackboard.adjust(PropertyKind::AIMultishotCount, 1);
                if shots >= i64::from(profile.num_shots) {
                    ctx.blackboard.remove_kind(PropertyKind::AIMultishotCount);
                    HideState::Unhide.store(ctx);
                } else if let Some(power) = profile.shoot_power.power {
                    ctx.blackboard.remove_power_cooldown(power);
                }
            }
            true
        }
        HideState::Unhide => {
            if use_power_direct(profile, ai, ctx, &profile.unhide_power).is_finished() {
                HideState::Recover.store(ctx);
            }
            true
        }
        HideState::Recover => {
            if ai.current_state() == Some(ContextKind::UsePower) {
                ai.switch_procedural_state(ctx, None, false);
            }
            match ai.handle_context(ctx, &Delay::new(&profile.recover)) {
                Status::Running => true,
                _ => {
                    HideState::Hide.store(ctx);
                    false
                }
            }
        }
    }
}

impl Profile for HideAndShootProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        default_sensory(ai, ctx, &self.base);

        if run_cycle(self, ai, ctx) {
            return;
        }
        if handle_procedural_power(self, ai, ctx).consumes_tick() {
            return;
        }
        default_melee_movement(ai, ctx, &self.base, &self.move_to, None);
    }

    fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        self.base.power_context(power).or_else(|| {
            [&self.hide_power, &self.shoot_power, &self.unhide_power]
                .into_iter()
                .find(|p| p.power == Some(power))
        })
    }
}
