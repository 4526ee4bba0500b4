//! Summoned allies: stay near the master, fight within a leash around it.

use ai_core::prototypes::{AllyProfile, ProfileBase};
use ai_core::{EntityId, PropertyKind};

use super::Profile;
use super::common::{begin_think, default_melee_movement};
use crate::contexts::{Despawn, MoveTo, Teleport};
use crate::picker::handle_procedural_power;
use crate::procedural::ProceduralAi;
use crate::senses::common_simplified_sensory;
use crate::think::ThinkContext;

fn master(ctx: &ThinkContext<'_>) -> Option<EntityId> {
    ctx.blackboard_entity(PropertyKind::AIAssistedEntityId)
        .filter(|&m| ctx.sim.is_alive(m))
}

fn within_leash(profile: &AllyProfile, ctx: &ThinkContext<'_>, master: EntityId) -> bool {
    profile.max_distance_from_master <= 0.0
        || ctx.entity_in_range(master, profile.max_distance_from_master)
}

impl Profile for AllyProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }

        let Some(master) = master(ctx) else {
            if let Some(despawn) = &self.despawn_without_master {
                tracing::debug!(agent = %ctx.agent, "master gone, despawning");
                ai.handle_context(ctx, &Despawn::new(despawn));
            }
            return;
        };

        if let Some(teleport) = &self.teleport
            && self.teleport_distance > 0.0
            && !ctx.entity_in_range(master, self.teleport_distance)
        {
            ai.handle_context(ctx, &Teleport::new(teleport));
            return;
        }

        common_simplified_sensory(ai, ctx, &self.base);
        let leashed = within_leash(self, ctx, master);
        if ctx.live_target().is_some() {
            if leashed {
                if handle_procedural_power(self, ai, ctx).consumes_tick() {
                    return;
                }
                default_melee_movement(
                    ai,
                    ctx,
                    &self.base,
                    &self.combat_move,
                    self.orbit.as_ref(),
                );
                return;
            }
            tracing::debug!(agent = %ctx.agent, "strayed too far from master, disengaging");
            ctx.clear_target();
            let last = ai.last_power_result();
            ai.switch_procedural_state(ctx, Some(&MoveTo::new(&self.follow, last)), true);
            return;
        }

        let last = ai.last_power_result();
        ai.handle_context(ctx, &MoveTo::new(&self.follow, last));
    }
}
