//! Building blocks shared by the profile catalog.

use ai_core::PropertyKind;
use ai_core::prototypes::{
    DelayContext, FlankContext, MoveToContext, OrbitContext, ProfileBase, RangedProfile,
    UsePowerContext, WanderContext,
};

use crate::contexts::{ContextKind, Delay, Flank, Flee, MoveTo, Orbit, Status, Wander};
use crate::procedural::ProceduralAi;
use crate::think::ThinkContext;

/// Skeleton prologue. Returns `false` when the caller must stop: the agent
/// is gone or an override handled this think.
pub fn begin_think(ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) -> bool {
    if !ctx.agent_alive() {
        return false;
    }
    !ai.handle_override_behavior(ctx)
}

/// Writes each power's initial cooldown, if it has one.
pub fn schedule_initial_cooldowns(ctx: &mut ThinkContext<'_>, powers: &[&UsePowerContext]) {
    for proto in powers {
        let Some(power) = proto.power else {
            continue;
        };
        if proto.initial_cooldown_max_ms == 0 {
            continue;
        }
        let delay = ctx.random_ms(proto.initial_cooldown_min_ms, proto.initial_cooldown_max_ms);
        if delay > 0 {
            let until = ctx.now.plus_millis(delay);
            ctx.blackboard.set_power_cooldown(power, until);
        }
    }
}

/// Faces the current target, if any.
pub fn face_target(ctx: &mut ThinkContext<'_>) {
    if let Some(pos) = ctx.target_position() {
        ctx.sim.look_at(ctx.agent, pos);
    }
}

fn move_to(ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>, proto: &MoveToContext) -> Status {
    let last = ai.last_power_result();
    ai.handle_context(ctx, &MoveTo::new(proto, last))
}

/// Drives an orbit; a failed orbit means the target is gone, so the
/// profile's no-target override takes over (unless suppressed).
fn orbit(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    base: &ProfileBase,
    proto: &OrbitContext,
) -> Status {
    let status = ai.handle_context(ctx, &Orbit::new(proto));
    if status.is_failed()
        && let Some(profile) = base.no_target_override
        && !ctx
            .blackboard
            .get_bool(PropertyKind::AIIgnoreNoTgtOverrideProfile)
        && !ai.has_no_target_override()
    {
        ai.set_no_target_override(ctx.agent, profile);
    }
    status
}

/// Close to melee range, then orbit (or just face the target).
pub fn default_melee_movement(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    base: &ProfileBase,
    approach: &MoveToContext,
    orbit_proto: Option<&OrbitContext>,
) -> Status {
    if ai.current_state() == Some(ContextKind::Orbit)
        && let Some(proto) = orbit_proto
    {
        return orbit(ai, ctx, base, proto);
    }
    let Some(target) = ctx.live_target() else {
        return Status::None;
    };
    if ai.current_state() == Some(ContextKind::MoveTo) || !ctx.entity_in_range(target, approach.range) {
        let status = move_to(ai, ctx, approach);
        if !status.is_completed() {
            return status;
        }
    }
    match orbit_proto {
        Some(proto) => orbit(ai, ctx, base, proto),
        None => {
            face_target(ctx);
            Status::None
        }
    }
}

/// Keep distance: kite away when the target closes in, approach until in
/// range with line of sight, otherwise orbit or face the target.
pub fn default_ranged_movement(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    profile: &RangedProfile,
) -> Status {
    if ai.current_state() == Some(ContextKind::Flee)
        && let Some(flee) = &profile.flee
    {
        let status = ai.handle_context(ctx, &Flee::new(flee));
        if status.is_running() {
            return status;
        }
    }
    let Some(target) = ctx.live_target() else {
        return Status::None;
    };

    if let Some(flee) = &profile.flee
        && profile.kite_range > 0.0
        && ctx.entity_in_range(target, profile.kite_range)
    {
        let status = ai.handle_context(ctx, &Flee::new(flee));
        if !status.is_failed() {
            return status;
        }
    }

    let approach = &profile.move_to;
    let needs_sight = approach.enforce_line_of_sight
        && !ctx
            .target_position()
            .is_some_and(|pos| ctx.sim.line_of_sight(ctx.agent, pos));
    if ai.current_state() == Some(ContextKind::MoveTo)
        || needs_sight
        || !ctx.entity_in_range(target, approach.range)
    {
        let status = move_to(ai, ctx, approach);
        if !status.is_completed() {
            return status;
        }
    }

    if let Some(proto) = &profile.orbit {
        return orbit(ai, ctx, &profile.base, proto);
    }
    if profile.face_target {
        face_target(ctx);
    }
    Status::None
}

/// Flank when the throttle allows, otherwise close in directly.
pub fn flanking_movement(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    flank: &FlankContext,
    approach: &MoveToContext,
) -> Status {
    if ctx.live_target().is_none() {
        return Status::None;
    }
    let status = ai.handle_context(ctx, &Flank::new(flank));
    if status.is_failed() {
        return move_to(ai, ctx, approach);
    }
    status
}

/// Wander legs separated by an optional pause.
pub fn wander_movement(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    wander: &WanderContext,
    pause: Option<&DelayContext>,
) -> Status {
    if ai.current_state() == Some(ContextKind::Delay)
        && let Some(delay) = pause
    {
        let status = ai.handle_context(ctx, &Delay::new(delay));
        if status.is_running() {
            return status;
        }
    }
    let status = ai.handle_context(ctx, &Wander::new(wander));
    if status.is_completed()
        && let Some(delay) = pause
    {
        return ai.handle_context(ctx, &Delay::new(delay));
    }
    status
}
