//! Turrets and other immobile agents: powers only, with an optional
//! rotation substate that runs alongside a channeled power.

use ai_core::prototypes::{ProfileBase, RotateContext, StationaryProfile};

use super::Profile;
use super::common::begin_think;
use crate::contexts::Rotate;
use crate::picker::handle_procedural_power;
use crate::procedural::ProceduralAi;
use crate::senses::default_sensory;
use crate::think::ThinkContext;

fn rotate_in_substate(ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>, rotate: &RotateContext) {
    if let Err(err) = ai.push_substate() {
        tracing::warn!(agent = %ctx.agent, %err, "cannot rotate during power");
        return;
    }
    ai.handle_context(ctx, &Rotate::new(rotate));
    if let Err(err) = ai.pop_substate() {
        tracing::error!(agent = %ctx.agent, %err, "rotation substate unbalanced");
    }
}

impl Profile for StationaryProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        default_sensory(ai, ctx, &self.base);
        let status = handle_procedural_power(self, ai, ctx);
        let Some(rotate) = &self.rotate else {
            return;
        };
        if status.is_running() {
            rotate_in_substate(ai, ctx, rotate);
        } else if !status.consumes_tick() && ctx.live_target().is_some() {
            ai.handle_context(ctx, &Rotate::new(rotate));
        }
    }
}
