//! Scavenger: find something to interact with, walk to it, use it, leave.

use ai_core::PropertyKind;
use ai_core::prototypes::{ProfileBase, ScavengerProfile};

use super::Profile;
use super::common::begin_think;
use crate::contexts::{Despawn, Interact, MoveTo, Status};
use crate::procedural::ProceduralAi;
use crate::selector::{register_selected_entity, select_entity};
use crate::think::ThinkContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ScavengerState {
    Select,
    Moving,
    Interacting,
    Despawning,
}

impl ScavengerState {
    pub fn load(ctx: &ThinkContext<'_>) -> Self {
        match ctx.blackboard.get_int(PropertyKind::AICustomStateVal1) {
            1 => Self::Moving,
            2 => Self::Interacting,
            3 => Self::Despawning,
            _ => Self::Select,
        }
    }

    fn store(self, ctx: &mut ThinkContext<'_>) {
        tracing::debug!(agent = %ctx.agent, state = %self, "scavenger state");
        ctx.blackboard
            .set_int(PropertyKind::AICustomStateVal1, self as i64);
    }
}

fn restart(profile: &ScavengerProfile, ctx: &mut ThinkContext<'_>) {
    ctx.blackboard.remove_kind(profile.interact.entity);
    ScavengerState::Select.store(ctx);
}

impl Profile for ScavengerProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }

        let mut state = ScavengerState::load(ctx);
        if state == ScavengerState::Select {
            let Some(found) = select_entity(ctx, &self.select) else {
                return;
            };
            register_selected_entity(ctx, self.select.register, Some(found));
            state = ScavengerState::Moving;
            state.store(ctx);
        }

        match state {
            ScavengerState::Select => {}
            ScavengerState::Moving => {
                let last = ai.last_power_result();
                match ai.handle_context(ctx, &MoveTo::new(&self.move_to, last)) {
                    Status::Completed => ScavengerState::Interacting.store(ctx),
                    Status::Failed => restart(self, ctx),
                    _ => {}
                }
            }
            ScavengerState::Interacting => match ai.handle_context(ctx, &Interact::new(&self.interact)) {
                Status::Completed => ScavengerState::Despawning.store(ctx),
                Status::Failed => restart(self, ctx),
                _ => {}
            },
            ScavengerState::Despawning => {
                if ai.handle_context(ctx, &Despawn::new(&self.despawn)).is_failed() {
                    restart(self, ctx);
                }
            }
        }
    }
}
