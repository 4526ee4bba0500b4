//! Orbit: strafe around the current target one arc at a time.

use ai_core::prototypes::OrbitContext;
use ai_core::PropertyKind;

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

/// Waypoint arrival tolerance.
const ORBIT_ARRIVAL_RANGE: f32 = 5.0;

pub struct Orbit<'p> {
    pub proto: &'p OrbitContext,
}

impl<'p> Orbit<'p> {
    pub fn new(proto: &'p OrbitContext) -> Self {
        Self { proto }
    }

    /// +1 counterclockwise, -1 clockwise. Chosen once and kept.
    fn direction(&self, ctx: &mut ThinkContext<'_>) -> f32 {
        let stored = ctx.blackboard.get_int(PropertyKind::AIOrbitDirection);
        if stored != 0 {
            return stored.signum() as f32;
        }
        let dir = if self.proto.randomize_direction && ctx.random.chance(0.5) {
            -1
        } else {
            1
        };
        ctx.blackboard.set_int(PropertyKind::AIOrbitDirection, dir);
        dir as f32
    }
}

impl ContextHandler for Orbit<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Orbit
    }

    fn validate(&self, ctx: &mut ThinkContext<'_>) -> bool {
        ctx.sim.has_locomotor(ctx.agent)
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let (Some(target_pos), Some(pos)) = (ctx.target_position(), ctx.position()) else {
            return Status::Failed;
        };
        let offset = pos - target_pos;
        let Some(heading) = offset.normalize_2d() else {
            return Status::Failed;
        };
        let radius = if self.proto.radius > 0.0 {
            self.proto.radius
        } else {
            offset.length_2d_sq().sqrt()
        };
        let arc = self.direction(ctx) * self.proto.angle_degrees.to_radians();
        let waypoint = target_pos + heading.rotate_2d(arc) * radius;

        if !ctx.sim.move_to(ctx.agent, waypoint, ORBIT_ARRIVAL_RANGE) {
            return Status::Failed;
        }
        ctx.blackboard.state_waypoint = Some(waypoint);
        Status::Running
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        if ctx.live_target().is_none() {
            return Status::Failed;
        }
        let Some(waypoint) = ctx.blackboard.state_waypoint else {
            return Status::Failed;
        };
        if ctx.point_in_range(waypoint, ORBIT_ARRIVAL_RANGE) || !ctx.sim.is_moving(ctx.agent) {
            return Status::Completed;
        }
        if let Some(target_pos) = ctx.target_position() {
            ctx.sim.look_at(ctx.agent, target_pos);
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
    use ai_core::Vector3;
    use ai_core::sandbox::SandboxEntity;

    #[test]
    fn fails_without_target() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let proto = OrbitContext::default();
        let status = h.with_ctx(agent, |ctx| Orbit::new(&proto).start(ctx));
        assert_eq!(status, Status::Failed);
    }

    #[test]
    fn waypoint_keeps_distance_to_target() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::flat(100.0, 0.0)));
        let target = h.spawn(SandboxEntity::at(Vector3::ZERO).faction(1));
        let proto = OrbitContext {
            randomize_direction: false,
            ..OrbitContext::default()
        };
        let waypoint = h.with_ctx(agent, |ctx| {
            ctx.set_target(Some(target));
            assert_eq!(Orbit::new(&proto).start(ctx), Status::Running);
            ctx.blackboard.state_waypoint
        });
        let waypoint = waypoint.unwrap_or(Vector3::ZERO);
        assert!((waypoint.distance_2d(Vector3::ZERO) - 100.0).abs() < 0.01);
        assert!(waypoint.y > 0.0);
    }
}
