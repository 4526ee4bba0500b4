//! UsePower: validate, activate and track one power use.

use ai_core::prototypes::UsePowerContext;
use ai_core::{PowerRef, PropertyKind};

use super::{ContextHandler, ContextKind, Status};
use crate::selector::select_entity;
use crate::think::ThinkContext;

pub struct UsePower<'p> {
    pub proto: &'p UsePowerContext,
}

impl<'p> UsePower<'p> {
    pub fn new(proto: &'p UsePowerContext) -> Self {
        Self { proto }
    }

    fn power(&self, ctx: &ThinkContext<'_>) -> Option<PowerRef> {
        if self.proto.power.is_none() {
            tracing::warn!(agent = %ctx.agent, "power context has no power");
        }
        self.proto.power
    }

    /// Switches to the configured alternate target, remembering the old one
    /// so `end` can restore it.
    fn switch_target(&self, ctx: &mut ThinkContext<'_>) -> bool {
        let Some(switch) = &self.proto.target_switch else {
            return true;
        };
        let Some(selected) = select_entity(ctx, &switch.select) else {
            return false;
        };
        let previous = ctx.target();
        ctx.blackboard
            .set_entity(PropertyKind::AIPreviousTargetId, previous);
        ctx.blackboard
            .set_bool(PropertyKind::AITargetSwitchPermanent, switch.permanent);
        ctx.set_target(Some(selected));
        true
    }
}

/// Gates that do not depend on the target: blackboard cooldown, difficulty
/// tier and ownership of the power.
pub(crate) fn power_available(
    ctx: &ThinkContext<'_>,
    proto: &UsePowerContext,
    power: PowerRef,
) -> bool {
    if ctx.now < ctx.blackboard.power_cooldown(power) {
        return false;
    }
    if let Some(range) = &proto.difficulty
        && !range.contains(ctx.sim.difficulty_tier())
    {
        return false;
    }
    ctx.sim.has_power(ctx.agent, power)
}

/// Target, range and line-of-sight checks followed by the power system's
/// own activation check.
pub(crate) fn check_target(ctx: &ThinkContext<'_>, proto: &UsePowerContext, power: PowerRef) -> bool {
    let Some(position) = ctx.position() else {
        return false;
    };
    if !proto.requires_target {
        return ctx
            .sim
            .can_activate_power(ctx.agent, power, None, position)
            .is_success();
    }

    let Some(target) = ctx.live_target() else {
        return false;
    };
    let Some(target_pos) = ctx.sim.position(target) else {
        return false;
    };
    let range = ctx.sim.power_range(ctx.agent, power).unwrap_or(0.0) + ctx.config.range_padding;
    if !ctx.entity_in_range(target, range) {
        return false;
    }
    if proto.require_line_of_sight && !ctx.sim.line_of_sight(ctx.agent, target_pos) {
        return false;
    }
    ctx.sim
        .can_activate_power(ctx.agent, power, Some(target), target_pos)
        .is_success()
}

/// Activates `power` at the current target (or in place). Returns the
/// resulting status.
pub(crate) fn activate(ctx: &mut ThinkContext<'_>, proto: &UsePowerContext, power: PowerRef) -> Status {
    let target = if proto.requires_target {
        ctx.live_target()
    } else {
        None
    };
    let Some(target_pos) = target
        .and_then(|t| ctx.sim.position(t))
        .or_else(|| ctx.position())
    else {
        return Status::Failed;
    };

    let result = ctx.sim.activate_power(ctx.agent, power, target, target_pos);
    if !result.is_success() {
        tracing::debug!(agent = %ctx.agent, %power, %result, "power activation rejected");
        return Status::Failed;
    }
    tracing::debug!(agent = %ctx.agent, %power, target = ?target, "power activated");

    if ctx.sim.executing_power(ctx.agent) == Some(power) {
        Status::Running
    } else {
        Status::Completed
    }
}

/// Writes the post-use cooldown, never shorter than one millisecond.
pub(crate) fn write_cooldown(ctx: &mut ThinkContext<'_>, power: PowerRef, min_ms: u64, max_ms: u64) {
    let cooldown = ctx.random_ms(min_ms, max_ms).max(1);
    let until = ctx.now.plus_millis(cooldown);
    ctx.blackboard.set_power_cooldown(power, until);
}

impl ContextHandler for UsePower<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::UsePower
    }

    fn validate(&self, ctx: &mut ThinkContext<'_>) -> bool {
        let Some(power) = self.power(ctx) else {
            return false;
        };
        if !power_available(ctx, self.proto, power) {
            return false;
        }
        // Target checks run after the switch in `start`.
        if self.proto.target_switch.is_some() {
            return true;
        }
        check_target(ctx, self.proto, power)
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(power) = self.power(ctx) else {
            return Status::Failed;
        };
        if self.proto.target_switch.is_some()
            && (!self.switch_target(ctx) || !check_target(ctx, self.proto, power))
        {
            return Status::Failed;
        }

        let status = activate(ctx, self.proto, power);
        if status.is_failed() {
            return status;
        }
        ctx.blackboard
            .set_power_ref(PropertyKind::AIActivePower, power);
        if self.proto.sync_attack {
            ctx.blackboard
                .set_power_ref(PropertyKind::AISyncAttackPower, power);
        }
        status
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(power) = self.proto.power else {
            return Status::Failed;
        };
        if ctx.sim.executing_power(ctx.agent) == Some(power) {
            Status::Running
        } else {
            Status::Completed
        }
    }

    fn end(&self, ctx: &mut ThinkContext<'_>, status: Status) {
        if status.is_completed()
            && let Some(power) = self.proto.power
        {
            write_cooldown(ctx, power, self.proto.cooldown_min_ms, self.proto.cooldown_max_ms);
        }
        self.kind().end(ctx, status);
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, status: Status) {
    if status == Status::Interrupted
        && let Some(power) = ctx.blackboard.power_ref(PropertyKind::AIActivePower)
        && ctx.sim.executing_power(ctx.agent) == Some(power)
    {
        tracing::debug!(agent = %ctx.agent, %power, "interrupting power");
        ctx.sim.end_power(ctx.agent, power);
    }
    ctx.blackboard.remove_kind(PropertyKind::AIActivePower);
    ctx.blackboard.remove_kind(PropertyKind::AISyncAttackPower);

    if ctx.blackboard.has(PropertyKind::AITargetSwitchPermanent) {
        if !ctx.blackboard.get_bool(PropertyKind::AITargetSwitchPermanent) {
            let previous = ctx
                .blackboard
                .get_entity(PropertyKind::AIPreviousTargetId)
                .filter(|&e| ctx.sim.is_alive(e));
            ctx.set_target(previous);
        }
        ctx.blackboard.remove_kind(PropertyKind::AITargetSwitchPermanent);
        ctx.blackboard.remove_kind(PropertyKind::AIPreviousTargetId);
    }
}
