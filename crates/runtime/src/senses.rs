//! Throttled target detection.
//!
//! Re-scanning for targets is the expensive part of a think, so full
//! acquisition runs at most once per sensing interval. Validating the
//! current target is cheap and runs every call.

use ai_core::prototypes::ProfileBase;
use ai_core::{CombatTargetFlags, CombatTargetType, EntityId, PropertyKind, Timestamp};

use crate::procedural::{OverrideType, ProceduralAi};
use crate::think::ThinkContext;

/// Per-agent sensory state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Senses {
    pub current_target: Option<EntityId>,
    next_sense_time: Timestamp,
}

impl Senses {
    pub fn new() -> Self {
        Self::default()
    }

    /// True at most once per `interval_ms`.
    pub fn should_sense(&mut self, now: Timestamp, interval_ms: u64) -> bool {
        if now < self.next_sense_time {
            return false;
        }
        self.next_sense_time = now.plus_millis(interval_ms.max(1));
        true
    }

    pub fn next_sense_time(&self) -> Timestamp {
        self.next_sense_time
    }

    /// Makes the next `should_sense` succeed regardless of the interval.
    pub fn wake(&mut self) {
        self.next_sense_time = Timestamp(0);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn aggro_range(ctx: &ThinkContext<'_>, base: &ProfileBase) -> f32 {
    base.senses
        .aggro_range
        .unwrap_or(ctx.config.default_aggro_range)
}

fn target_flags(base: &ProfileBase) -> CombatTargetFlags {
    let mut flags = base.senses.target_flags;
    if base.senses.require_line_of_sight {
        flags |= CombatTargetFlags::CHECK_LINE_OF_SIGHT;
    }
    flags
}

/// Cheap recheck of the current target: liveness, relationship, leash and
/// line of sight. Clears the target when any check fails.
pub fn validate_current_target(
    ctx: &mut ThinkContext<'_>,
    base: &ProfileBase,
    target_type: CombatTargetType,
) -> Option<EntityId> {
    let target = ctx.target()?;
    if !ctx.sim.is_in_world(ctx.agent) {
        return None;
    }

    let mut valid = ctx
        .sim
        .valid_target(ctx.agent, target, target_type, target_flags(base));
    let leash = base
        .senses
        .leash_range
        .unwrap_or(ctx.config.default_leash_range);
    if valid && leash > 0.0 && !ctx.entity_in_range(target, leash) {
        tracing::debug!(agent = %ctx.agent, target = %target, "target leashed");
        valid = false;
    }

    if valid {
        Some(target)
    } else {
        ctx.clear_target();
        None
    }
}

/// Full sensory pass for the hostile pool. Installs the profile's no-target
/// override when nothing is found, unless `AIIgnoreNoTgtOverrideProfile` is
/// set on the blackboard.
pub fn default_sensory(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    base: &ProfileBase,
) -> Option<EntityId> {
    sense(ai, ctx, base, true)
}

/// Same as [`default_sensory`] but never installs the no-target override.
pub fn common_simplified_sensory(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    base: &ProfileBase,
) -> Option<EntityId> {
    sense(ai, ctx, base, false)
}

fn sense(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    base: &ProfileBase,
    allow_override: bool,
) -> Option<EntityId> {
    if !ctx.sim.is_in_world(ctx.agent) {
        return None;
    }

    let mut target = validate_current_target(ctx, base, CombatTargetType::Hostile);
    let interval = base
        .senses
        .interval_ms
        .unwrap_or(ctx.config.sense_interval_ms);

    if target.is_none() && ctx.senses.should_sense(ctx.now, interval) {
        target = ctx.sim.closest_valid_hostile_target(
            ctx.agent,
            aggro_range(ctx, base),
            target_flags(base),
        );
        if target.is_some() {
            ctx.set_target(target);
        }
    }

    match target {
        Some(_) => {
            if ai.has_no_target_override() {
                tracing::debug!(agent = %ctx.agent, "target acquired, leaving no-target override");
                ai.clear_override(OverrideType::Full);
            }
        }
        None if allow_override => {
            let suppressed = ctx
                .blackboard
                .get_bool(PropertyKind::AIIgnoreNoTgtOverrideProfile);
            if let Some(profile) = base.no_target_override
                && !suppressed
                && !ai.has_no_target_override()
            {
                ai.set_no_target_override(ctx.agent, profile);
            }
        }
        None => {}
    }

    target
}
