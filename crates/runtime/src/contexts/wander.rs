//! Wander: walk to a random point in a radius band.

use ai_core::Vector3;
use ai_core::prototypes::{WanderBase, WanderContext};

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct Wander<'p> {
    pub proto: &'p WanderContext,
}

impl<'p> Wander<'p> {
    pub fn new(proto: &'p WanderContext) -> Self {
        Self { proto }
    }

    fn origin(&self, ctx: &ThinkContext<'_>) -> Option<Vector3> {
        let current = ctx.position()?;
        Some(match self.proto.base {
            WanderBase::Current => current,
            WanderBase::SpawnPoint => ctx.blackboard.spawn_point.unwrap_or(current),
            WanderBase::Target => ctx.target_position().unwrap_or(current),
        })
    }
}

impl ContextHandler for Wander<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Wander
    }

    fn validate(&self, ctx: &mut ThinkContext<'_>) -> bool {
        ctx.sim.has_locomotor(ctx.agent)
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(origin) = self.origin(ctx) else {
            return Status::Failed;
        };
        let yaw = ctx.random.range_f32(0.0, std::f32::consts::TAU);
        let radius = ctx
            .random
            .range_f32(self.proto.radius_min, self.proto.radius_max);
        let waypoint = origin + Vector3::from_yaw(yaw) * radius;
        if !ctx.sim.move_to(ctx.agent, waypoint, self.proto.arrival_range) {
            return Status::Failed;
        }
        ctx.blackboard.state_waypoint = Some(waypoint);
        Status::Running
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(waypoint) = ctx.blackboard.state_waypoint else {
            return Status::Failed;
        };
        if ctx.point_in_range(waypoint, self.proto.arrival_range) || !ctx.sim.is_moving(ctx.agent) {
            return Status::Completed;
        }
        Status::Running
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, _status: Status) {
    ctx.blackboard.state_waypoint = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use ai_core::sandbox::SandboxEntity;

    #[test]
    fn waypoint_lies_in_band_around_spawn() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::flat(500.0, 500.0)));
        let proto = WanderContext {
            base: WanderBase::SpawnPoint,
            radius_min: 50.0,
            radius_max: 100.0,
            ..WanderContext::default()
        };
        for _ in 0..8 {
            let waypoint = h.with_ctx(agent, |ctx| {
                ctx.blackboard.spawn_point = Some(Vector3::ZERO);
                assert_eq!(Wander::new(&proto).start(ctx), Status::Running);
                ctx.blackboard.state_waypoint
            });
            let dist = waypoint.map_or(0.0, |w| w.distance_2d(Vector3::ZERO));
            assert!((49.9..=100.1).contains(&dist), "distance {dist}");
        }
    }

    #[test]
    fn stationary_agents_cannot_wander() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO).stationary());
        let proto = WanderContext::default();
        assert!(!h.with_ctx(agent, |ctx| Wander::new(&proto).validate(ctx)));
    }
}
