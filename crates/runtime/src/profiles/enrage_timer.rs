//! Enrage timer.
//!
//! The timer arms the first time an avatar comes within `search_radius`.
//! The absolute enrage time is stored as `EnrageStartTime` on the agent
//! itself, so it survives blackboard resets. Once it runs out the enrage
//! power is used directly:
//!
//! ```text
//! Default ──(timer elapsed, power started)──► Enraging ──(power completed)──► Enraged
//!    ▲                                            │
//!    └──────────────(power failed)────────────────┘
//! ```

use ai_core::prototypes::{EnrageTimerProfile, ProfileBase, UsePowerContext};
use ai_core::{PowerRef, PropertyKind, Timestamp};

use super::Profile;
use super::common::{begin_think, default_melee_movement};
use crate::contexts::Status;
use crate::picker::{handle_procedural_power, use_power_direct};
use crate::procedural::ProceduralAi;
use crate::senses::default_sensory;
use crate::think::ThinkContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EnrageState {
    Default,
    Enraging,
    Enraged,
}

impl EnrageState {
    pub fn load(ctx: &ThinkContext<'_>) -> Self {
        match ctx.blackboard.get_int(PropertyKind::AIEnrageState) {
            1 => Self::Enraging,
            2 => Self::Enraged,
            _ => Self::Default,
        }
    }

    fn store(self, ctx: &mut ThinkContext<'_>) {
        tracing::debug!(agent = %ctx.agent, state = %self, "enrage state");
        ctx.blackboard
            .set_int(PropertyKind::AIEnrageState, self as i64);
    }
}

fn is_enrage_power(profile: &EnrageTimerProfile, proto: &UsePowerContext) -> bool {
    proto.power.is_some() && proto.power == profile.enrage_power.power
}

/// Arms the timer once an avatar is close. Returns the enrage deadline.
fn arm_timer(profile: &EnrageTimerProfile, ctx: &mut ThinkContext<'_>) -> Option<Timestamp> {
    let armed = ctx
        .sim
        .properties(ctx.agent)
        .filter(|props| props.has(PropertyKind::EnrageStartTime))
        .map(|props| props.get_time(PropertyKind::EnrageStartTime));
    if armed.is_some() {
        return armed;
    }

    let center = ctx.position()?;
    let avatar_near = ctx
        .sim
        .entities_in_range(center, profile.search_radius)
        .into_iter()
        .any(|e| ctx.sim.is_avatar(e) && ctx.sim.is_alive(e));
    if !avatar_near {
        return None;
    }
    let duration_ms = (profile.enrage_timer_minutes.max(0.0) * 60_000.0) as u64;
    let deadline = ctx.now.plus_millis(duration_ms);
    let props = ctx.sim.properties_mut(ctx.agent)?;
    props.set_time(PropertyKind::EnrageStartTime, deadline);
    tracing::debug!(agent = %ctx.agent, %deadline, "enrage timer armed");
    Some(deadline)
}

impl Profile for EnrageTimerProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        default_sensory(ai, ctx, &self.base);

        if let Some(deadline) = arm_timer(self, ctx)
            && EnrageState::load(ctx) == EnrageState::Default
            && ctx.now >= deadline
            && use_power_direct(self, ai, ctx, &self.enrage_power).consumes_tick()
        {
            return;
        }

        if handle_procedural_power(self, ai, ctx).consumes_tick() {
            return;
        }
        default_melee_movement(ai, ctx, &self.base, &self.move_to, self.orbit.as_ref());
    }

    fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        self.base.power_context(power).or_else(|| {
            (self.enrage_power.power == Some(power)).then_some(&self.enrage_power)
        })
    }

    fn on_power_started(
        &self,
        _ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        power: &UsePowerContext,
        _status: Status,
    ) {
        if is_enrage_power(self, power) && EnrageState::load(ctx) == EnrageState::Default {
            EnrageState::Enraging.store(ctx);
        }
    }

    fn on_power_ended(
        &self,
        _ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        power: &UsePowerContext,
        status: Status,
    ) {
        if !is_enrage_power(self, power) || EnrageState::load(ctx) != EnrageState::Enraging {
            return;
        }
        match status {
            Status::Completed => EnrageState::Enraged.store(ctx),
            Status::Failed => EnrageState::Default.store(ctx),
            _ => {}
        }
    }
}
