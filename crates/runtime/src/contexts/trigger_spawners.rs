//! TriggerSpawners: poke nearby spawners of the configured prototypes.

use ai_core::prototypes::TriggerSpawnersContext;

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct TriggerSpawners<'p> {
    pub proto: &'p TriggerSpawnersContext,
}

impl<'p> TriggerSpawners<'p> {
    pub fn new(proto: &'p TriggerSpawnersContext) -> Self {
        Self { proto }
    }
}

impl ContextHandler for TriggerSpawners<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::TriggerSpawners
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(center) = ctx.position() else {
            return Status::Failed;
        };
        let spawners: Vec<_> = ctx
            .sim
            .entities_in_range(center, self.proto.radius)
            .into_iter()
            .filter(|&e| ctx.sim.is_spawner(e))
            .filter(|&e| {
                self.proto.spawners.is_empty()
                    || ctx
                        .sim
                        .prototype(e)
                        .is_some_and(|p| self.proto.spawners.contains(&p))
            })
            .collect();

        let mut triggered = 0usize;
        for spawner in spawners {
            if ctx.sim.trigger_spawner(spawner, self.proto.action) {
                triggered += 1;
            }
        }
        tracing::debug!(agent = %ctx.agent, triggered, action = ?self.proto.action, "spawners triggered");
        if triggered > 0 {
            Status::Completed
        } else {
            Status::Failed
        }
    }

    fn update(&self, _ctx: &mut ThinkContext<'_>) -> Status {
        Status::Completed
    }
}
