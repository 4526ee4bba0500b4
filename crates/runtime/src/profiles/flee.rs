//! Feared behavior: run from whatever the agent is targeting.

use ai_core::prototypes::{FleeProfile, ProfileBase};

use super::Profile;
use super::common::begin_think;
use crate::contexts::Flee;
use crate::procedural::ProceduralAi;
use crate::think::ThinkContext;

impl Profile for FleeProfile {
    fn base(&self) -> &ProfileBase {
        &self.base
    }

    fn think(&self, ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>) {
        if !begin_think(ai, ctx) {
            return;
        }
        ai.handle_context(ctx, &Flee::new(&self.flee));
    }
}
