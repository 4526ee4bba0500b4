//! Flank: reposition relative to the target's facing, throttled and timed.

use ai_core::prototypes::FlankContext;
use ai_core::{PropertyKind, Vector3};

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

pub struct Flank<'p> {
    pub proto: &'p FlankContext,
}

impl<'p> Flank<'p> {
    pub fn new(proto: &'p FlankContext) -> Self {
        Self { proto }
    }

    fn waypoint(&self, ctx: &mut ThinkContext<'_>) -> Option<Vector3> {
        let target = ctx.live_target()?;
        let target_pos = ctx.sim.position(target)?;
        let facing = ctx.sim.orientation(target)?;
        let mut angle = self.proto.angle_degrees.to_radians();
        if self.proto.randomize_angle && ctx.random.chance(0.5) {
            angle = -angle;
        }
        Some(target_pos + Vector3::from_yaw(facing + angle) * self.proto.radius)
    }
}

impl ContextHandler for Flank<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Flank
    }

    fn validate(&self, ctx: &mut ThinkContext<'_>) -> bool {
        ctx.sim.has_locomotor(ctx.agent)
            && ctx.live_target().is_some()
            && ctx.now >= ctx.blackboard.get_time(PropertyKind::AIProceduralNextFlankTime)
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        // The throttle is armed even when this attempt fails.
        let interval = ctx.random_ms(self.proto.interval_min_ms, self.proto.interval_max_ms);
        let next = ctx.now.plus_millis(interval);
        ctx.blackboard
            .set_time(PropertyKind::AIProceduralNextFlankTime, next);

        let Some(waypoint) = self.waypoint(ctx) else {
            return Status::Failed;
        };
        if !ctx.sim.move_to(ctx.agent, waypoint, self.proto.arrival_range) {
            return Status::Failed;
        }
        let deadline = ctx.now.plus_millis(self.proto.timeout_ms);
        ctx.blackboard.set_time(PropertyKind::AIFlankTimeout, deadline);
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
        if ctx.now >= ctx.blackboard.get_time(PropertyKind::AIFlankTimeout) {
            tracing::debug!(agent = %ctx.agent, "flank timed out");
            return if self.proto.fail_on_timeout {
                Status::Failed
            } else {
                Status::Completed
            };
        }
        if ctx.point_in_range(waypoint, self.proto.arrival_range) {
            return Status::Completed;
        }
        if !ctx.sim.is_moving(ctx.agent)
            && !ctx.sim.move_to(ctx.agent, waypoint, self.proto.arrival_range)
        {
            return Status::Failed;
        }
        Status::Running
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, _status: Status) {
    ctx.blackboard.remove_kind(PropertyKind::AIFlankTimeout);
    ctx.blackboard.state_waypoint = None;
}
