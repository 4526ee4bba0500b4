use ai_core::prototypes::{ProfileBase, RangedProfile};

use super::Profile;
use super::common::{begin_think, default_ranged_movement};
use crate::picker::handle_procedural_power;
use crate::procedural::ProceduralAi;
use crate::senses::default_sensory;
use crate::think::ThinkContext;

impl Profile for RangedProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        default_sensory(ai, ctx, &self.base);
        if handle_procedural_power(self, ai, ctx).consumes_tick() {
            return;
        }
        default_ranged_movement(ai, ctx, self);
    }
}
