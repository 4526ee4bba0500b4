use ai_core::prototypes::{FlankerProfile, ProfileBase};

use super::Profile;
use super::common::{begin_think, flanking_movement};
use crate::picker::handle_procedural_power;
use crate::procedural::ProceduralAi;
use crate::senses::default_sensory;
use crate::think::ThinkContext;

impl Profile for FlankerProfile {
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
        flanking_movement(ai, ctx, &self.flank, &self.move_to);
    }
}
