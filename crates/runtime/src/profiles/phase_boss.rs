//! Health-gated boss phases.
//!
//! `AICustomStateVal1` counts the phases entered so far (phase index + 1);
//! `AICustomStateVal2` flags a pending transition power.

use ai_core::prototypes::{
    BossPhase, PhaseBossProfile, ProfileBase, TriggerSpawnersContext, UsePowerContext,
};
use ai_core::{PowerRef, PropertyKind};

use super::Profile;
use super::common::{begin_think, default_melee_movement};
use crate::contexts::TriggerSpawners;
use crate::picker::{PowerPicker, handle_procedural_power, use_power_direct};
use crate::procedural::ProceduralAi;
use crate::senses::default_sensory;
use crate::think::ThinkContext;

fn current_phase<'p>(
    profile: &'p PhaseBossProfile,
    ctx: &ThinkContext<'_>,
) -> Option<&'p BossPhase> {
    let entered = ctx.blackboard.get_int(PropertyKind::AICustomStateVal1);
    let index = usize::try_from(entered).ok()?.checked_sub(1)?;
    profile.phases.get(index)
}

/// Enters every phase whose threshold the agent's health has crossed.
fn advance_phases(
    profile: &PhaseBossProfile,
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
) {
    let Some(health) = ctx.sim.health(ctx.agent) else {
        return;
    };
    let pct = health.percent();
    let mut entered = usize::try_from(ctx.blackboard.get_int(PropertyKind::AICustomStateVal1))
        .unwrap_or(0);

    while let Some(phase) = profile.phases.get(entered)
        && pct <= phase.health_threshold_pct
    {
        entered += 1;
        tracing::debug!(agent = %ctx.agent, phase = entered, health = pct, "entering boss phase");
        ctx.blackboard
            .set_int(PropertyKind::AICustomStateVal1, entered as i64);
        if phase.transition_power.is_some() {
            ctx.blackboard
                .set_bool(PropertyKind::AICustomStateVal2, true);
        }
        if let Some(spawners) = &phase.spawners {
            trigger_in_substate(ai, ctx, spawners);
        }
    }
}

/// One-shot spawner trigger that leaves the primary state untouched.
fn trigger_in_substate(
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    spawners: &TriggerSpawnersContext,
) {
    if let Err(err) = ai.push_substate() {
        tracing::warn!(agent = %ctx.agent, %err, "cannot trigger phase spawners");
        return;
    }
    ai.handle_context(ctx, &TriggerSpawners::new(spawners));
    if let Err(err) = ai.pop_substate() {
        tracing::error!(agent = %ctx.agent, %err, "spawner substate unbalanced");
    }
}

impl Profile for PhaseBossProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        default_sensory(ai, ctx, &self.base);
        advance_phases(self, ai, ctx);

        let phase = current_phase(self, ctx);
        if ctx.blackboard.get_bool(PropertyKind::AICustomStateVal2) {
            match phase.and_then(|p| p.transition_power.as_ref()) {
                Some(transition) => {
                    let status = use_power_direct(self, ai, ctx, transition);
                    if status.is_running() {
                        return;
                    }
                    // A failed transition is not retried.
                    ctx.blackboard.remove_kind(PropertyKind::AICustomStateVal2);
                    if status.is_completed() {
                        return;
                    }
                }
                None => ctx.blackboard.remove_kind(PropertyKind::AICustomStateVal2),
            }
        }

        if handle_procedural_power(self, ai, ctx).consumes_tick() {
            return;
        }
        if phase.is_some_and(|p| p.suppress_movement) {
            return;
        }
        default_melee_movement(ai, ctx, &self.base, &self.move_to, self.orbit.as_ref());
    }

    fn populate_power_picker<'p>(&'p self, ctx: &ThinkContext<'_>, picker: &mut PowerPicker<'p>) {
        let powers = match current_phase(self, ctx) {
            Some(phase) if !phase.powers.is_empty() => &phase.powers,
            _ => &self.base.powers,
        };
        for power in powers {
            picker.add(power);
        }
    }

    fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        self.base.power_context(power).or_else(|| {
            self.phases.iter().find_map(|phase| {
                phase
                    .transition_power
                    .iter()
                    .chain(phase.powers.iter())
                    .find(|p| p.power == Some(power))
            })
        })
    }
}
