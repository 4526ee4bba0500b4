//! Multishot: one pick fires `num_shots` uses of the same power.
//!
//! The shot counter lives in `AIMultishotCount`. Between shots the power's
//! blackboard cooldown is lifted and the use reports `Running`, so the
//! attack-rate gate is only scheduled after the final shot.

use ai_core::prototypes::{MultishotProfile, ProfileBase, UsePowerContext};
use ai_core::{CombatTargetType, PowerRef, PropertyKind};

use super::Profile;
use super::common::{begin_think, default_melee_movement};
use crate::contexts::{ContextKind, Status, UsePower};
use crate::picker::{PowerPicker, handle_procedural_power, use_power_direct};
use crate::procedural::ProceduralAi;
use crate::senses::default_sensory;
use crate::think::ThinkContext;

fn is_multishot(profile: &MultishotProfile, proto: &UsePowerContext) -> bool {
    proto.power.is_some() && proto.power == profile.multishot_power.power
}

/// Switches to a different random hostile, if there is one.
fn retarget(profile: &MultishotProfile, ctx: &mut ThinkContext<'_>) {
    let range = profile
        .base
        .senses
        .aggro_range
        .unwrap_or(ctx.config.default_aggro_range);
    let current = ctx.target();
    let others: Vec<_> = ctx
        .sim
        .targets_in_range(
            ctx.agent,
            range,
            CombatTargetType::Hostile,
            profile.base.senses.target_flags,
        )
        .into_iter()
        .filter(|&candidate| Some(candidate) != current)
        .collect();
    if others.is_empty() {
        return;
    }
    let index = ctx.random.range_u64(0, others.len() as u64 - 1) as usize;
    ctx.set_target(others.get(index).copied());
}

impl Profile for MultishotProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        default_sensory(ai, ctx, &self.base);

        let mid_volley = ctx.blackboard.get_int(PropertyKind::AIMultishotCount) > 0
            && ai.current_state() != Some(ContextKind::UsePower);
        let status = if mid_volley {
            let status = use_power_direct(self, ai, ctx, &self.multishot_power);
            if status.is_failed() {
                ctx.blackboard.remove_kind(PropertyKind::AIMultishotCount);
            }
            status
        } else {
            handle_procedural_power(self, ai, ctx)
        };
        if status.consumes_tick() {
            return;
        }
        default_melee_movement(ai, ctx, &self.base, &self.move_to, None);
    }

    fn populate_power_picker<'p>(&'p self, _ctx: &ThinkContext<'_>, picker: &mut PowerPicker<'p>) {
        for power in &self.base.powers {
            picker.add(power);
        }
        picker.add(&self.multishot_power);
    }

    fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        self.base.power_context(power).or_else(|| {
            (self.multishot_power.power == Some(power)).then_some(&self.multishot_power)
        })
    }

    fn handle_power_entry(
        &self,
        ai: &mut ProceduralAi,
        ctx: &mut ThinkContext<'_>,
        proto: &UsePowerContext,
    ) -> Status {
        let status = ai.handle_context(ctx, &UsePower::new(proto));
        if !is_multishot(self, proto) {
            return status;
        }
        match status {
            Status::Completed => {
                let shots = ctx.blackboard.adjust(PropertyKind::AIMultishotCount, 1);
                if shots < i64::from(self.num_shots) {
                    if let Some(power) = proto.power {
                        ctx.blackboard.remove_power_cooldown(power);
                    }
                    if self.retarget_per_shot {
                        retarget(self, ctx);
                    }
                    tracing::trace!(agent = %ctx.agent, shots, "multishot volley continues");
                    Status::Running
                } else {
                    ctx.blackboard.remove_kind(PropertyKind::AIMultishotCount);
                    Status::Completed
                }
            }
            Status::Failed => {
                ctx.blackboard.remove_kind(PropertyKind::AIMultishotCount);
                Status::Failed
            }
            other => other,
        }
    }
}
