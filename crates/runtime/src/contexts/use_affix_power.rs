//! UseAffixPower: use one of the agent's affix powers, tried in random order.

use ai_core::prototypes::{AffixSettings, UsePowerContext};
use ai_core::{PowerRef, PropertyKind};

use super::use_power::{activate, check_target, power_available, write_cooldown};
use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct UseAffixPower<'p> {
    pub settings: &'p AffixSettings,
}

impl<'p> UseAffixPower<'p> {
    pub fn new(settings: &'p AffixSettings) -> Self {
        Self { settings }
    }

    fn context_for(&self, power: PowerRef) -> UsePowerContext {
        UsePowerContext {
            power: Some(power),
            ..self.settings.context.clone()
        }
    }

    fn usable(&self, ctx: &ThinkContext<'_>, power: PowerRef) -> bool {
        let proto = self.context_for(power);
        power_available(ctx, &proto, power) && check_target(ctx, &proto, power)
    }

    /// Affix powers in a random order drawn from the shared stream.
    fn shuffled(ctx: &mut ThinkContext<'_>) -> Vec<PowerRef> {
        let mut powers = ctx.sim.affix_powers(ctx.agent);
        for i in (1..powers.len()).rev() {
            let j = ctx.random.range_u64(0, i as u64) as usize;
            powers.swap(i, j);
        }
        powers
    }
}

impl ContextHandler for UseAffixPower<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::UseAffixPower
    }

    fn validate(&self, ctx: &mut ThinkContext<'_>) -> bool {
        ctx.sim
            .affix_powers(ctx.agent)
            .into_iter()
            .any(|power| self.usable(ctx, power))
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        for power in Self::shuffled(ctx) {
            if !self.usable(ctx, power) {
                continue;
            }
            let status = activate(ctx, &self.context_for(power), power);
            if status.is_failed() {
                continue;
            }
            ctx.blackboard
                .set_power_ref(PropertyKind::AIActiveAffixPower, power);
            return status;
        }
        Status::Failed
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(power) = ctx.blackboard.power_ref(PropertyKind::AIActiveAffixPower) else {
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
            && let Some(power) = ctx.blackboard.power_ref(PropertyKind::AIActiveAffixPower)
        {
            let proto = &self.settings.context;
            write_cooldown(ctx, power, proto.cooldown_min_ms, proto.cooldown_max_ms);
        }
        self.kind().end(ctx, status);
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, status: Status) {
    if status == Status::Interrupted
        && let Some(power) = ctx.blackboard.power_ref(PropertyKind::AIActiveAffixPower)
        && ctx.sim.executing_power(ctx.agent) == Some(power)
    {
        ctx.sim.end_power(ctx.agent, power);
    }
    ctx.blackboard.remove_kind(PropertyKind::AIActiveAffixPower);
}
