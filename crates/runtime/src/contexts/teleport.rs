//! Teleport: jump next to the assisted entity or back to spawn.

use ai_core::prototypes::{TeleportContext, TeleportDestination};
use ai_core::{PropertyKind, Vector3};

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct Teleport<'p> {
    pub proto: &'p TeleportContext,
}

impl<'p> Teleport<'p> {
    pub fn new(proto: &'p TeleportContext) -> Self {
        Self { proto }
    }

    fn destination(&self, ctx: &ThinkContext<'_>) -> Option<Vector3> {
        match self.proto.destination {
            TeleportDestination::AssistedEntity => {
                let master = ctx.blackboard_entity(PropertyKind::AIAssistedEntityId)?;
                let master_pos = ctx.sim.position(master)?;
                // Land on the side facing the agent, `offset` away.
                let toward_agent = ctx
                    .position()
                    .and_then(|pos| (pos - master_pos).normalize_2d())
                    .unwrap_or(Vector3::flat(1.0, 0.0));
                Some(master_pos + toward_agent * self.proto.offset)
            }
            TeleportDestination::SpawnPosition => ctx.blackboard.spawn_point,
        }
    }
}

impl ContextHandler for Teleport<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Teleport
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(destination) = self.destination(ctx) else {
            return Status::Failed;
        };
        ctx.sim.stop(ctx.agent);
        if ctx.sim.teleport(ctx.agent, destination) {
            Status::Completed
        } else {
            Status::Failed
        }
    }

    fn update(&self, _ctx: &mut ThinkContext<'_>) -> Status {
        Status::Completed
    }
}
