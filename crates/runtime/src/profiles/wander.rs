//! Aimless wandering. Typically installed as a no-target override, so it
//! senses without installing overrides of its own.

use ai_core::prototypes::{ProfileBase, WanderProfile};

use super::Profile;
use super::common::{begin_think, wander_movement};
use crate::picker::handle_procedural_power;
use crate::procedural::ProceduralAi;
use crate::senses::common_simplified_sensory;
use crate::think::ThinkContext;

impl Profile for WanderProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        common_simplified_sensory(ai, ctx, &self.base);
        if handle_procedural_power(self, ai, ctx).consumes_tick() {
            return;
        }
        wander_movement(ai, ctx, &self.wander, self.delay.as_ref());
    }
}
