//! Despawn: remove the agent or one of its blackboard entities.

use ai_core::prototypes::{DespawnContext, DespawnTarget};
use ai_core::{EntityId, PropertyKind};

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct Despawn<'p> {
    pub proto: &'p DespawnContext,
}

impl<'p> Despawn<'p> {
    pub fn new(proto: &'p DespawnContext) -> Self {
        Self { proto }
    }

    fn subject(&self, ctx: &ThinkContext<'_>) -> Option<EntityId> {
        match self.proto.target {
            DespawnTarget::Agent => Some(ctx.agent),
            DespawnTarget::Target => ctx.target().filter(|&t| ctx.sim.is_in_world(t)),
            DespawnTarget::InteractEntity => ctx.blackboard_entity(PropertyKind::AIInteractEntityId),
        }
    }
}

impl ContextHandler for Despawn<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Despawn
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(subject) = self.subject(ctx) else {
            return Status::Failed;
        };
        let done = if self.proto.kill {
            ctx.sim.kill(subject, Some(ctx.agent))
        } else {
            ctx.sim.destroy(subject)
        };
        if !done {
            return Status::Failed;
        }
        tracing::debug!(agent = %ctx.agent, entity = %subject, kill = self.proto.kill, "despawned");
        Status::Completed
    }

    fn update(&self, _ctx: &mut ThinkContext<'_>) -> Status {
        Status::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use ai_core::Vector3;
    use ai_core::sandbox::SandboxEntity;

    #[test]
    fn destroys_the_agent() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let proto = DespawnContext::default();
        let status = h.with_ctx(agent, |ctx| Despawn::new(&proto).start(ctx));
        assert_eq!(status, Status::Completed);
        assert!(h.world.entity(agent).is_none());
    }

    #[test]
    fn kills_interact_entity_and_fails_when_missing() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let crate_entity = h.spawn(SandboxEntity::at(Vector3::flat(5.0, 0.0)));
        let proto = DespawnContext {
            target: DespawnTarget::InteractEntity,
            kill: true,
        };
        let handler = Despawn::new(&proto);
        assert_eq!(h.with_ctx(agent, |ctx| handler.start(ctx)), Status::Failed);
        let status = h.with_ctx(agent, |ctx| {
            ctx.blackboard
                .set_entity(PropertyKind::AIInteractEntityId, Some(crate_entity));
            handler.start(ctx)
        });
        assert_eq!(status, Status::Completed);
        assert!(h.world.entity(crate_entity).is_some_and(|e| e.dead));
    }
}
