//! Interact: use the entity named by a blackboard slot.

use ai_core::prototypes::InteractContext;

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct Interact<'p> {
    pub proto: &'p InteractContext,
}

impl<'p> Interact<'p> {
    pub fn new(proto: &'p InteractContext) -> Self {
        Self { proto }
    }
}

impl ContextHandler for Interact<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Interact
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(entity) = ctx.blackboard_entity(self.proto.entity) else {
            return Status::Failed;
        };
        if !ctx.entity_in_range(entity, self.proto.range) {
            return Status::Failed;
        }
        if ctx.sim.interact(ctx.agent, entity) {
            tracing::debug!(agent = %ctx.agent, %entity, "interacted");
            Status::Completed
        } else {
            Status::Failed
        }
    }

    fn update(&self, _ctx: &mut ThinkContext<'_>) -> Status {
        Status::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use ai_core::sandbox::SandboxEntity;
    use ai_core::{PropertyKind, Vector3};

    #[test]
    fn requires_entity_in_range() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let near = h.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)));
        let far = h.spawn(SandboxEntity::at(Vector3::flat(500.0, 0.0)));
        let proto = InteractContext::default();
        let handler = Interact::new(&proto);
        let statuses = h.with_ctx(agent, |ctx| {
            ctx.blackboard
                .set_entity(PropertyKind::AIInteractEntityId, Some(far));
            let far_status = handler.start(ctx);
            ctx.blackboard
                .set_entity(PropertyKind::AIInteractEntityId, Some(near));
            (far_status, handler.start(ctx))
        });
        assert_eq!(statuses, (Status::Failed, Status::Completed));
    }
}
