//! Rotate: a fixed turn, or continuous tracking of the target.

use std::f32::consts::{PI, TAU};

use ai_core::PropertyKind;
use ai_core::prototypes::{RotateContext, RotateDirection};

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

const YAW_TOLERANCE: f32 = 0.01;

pub struct Rotate<'p> {
    pub proto: &'p RotateContext,
}

impl<'p> Rotate<'p> {
    pub fn new(proto: &'p RotateContext) -> Self {
        Self { proto }
    }

    fn track(ctx: &mut ThinkContext<'_>) -> Status {
        match ctx.target_position() {
            Some(pos) => {
                ctx.sim.look_at(ctx.agent, pos);
                Status::Running
            }
            None => Status::Failed,
        }
    }

    fn turn_toward_goal(ctx: &mut ThinkContext<'_>) -> Status {
        let goal = ctx.blackboard.get_float(PropertyKind::AIRotateGoalYaw);
        let Some(yaw) = ctx.sim.orientation(ctx.agent) else {
            return Status::Failed;
        };
        if yaw_delta(yaw, goal).abs() <= YAW_TOLERANCE {
            return Status::Completed;
        }
        if !ctx.sim.rotate_to(ctx.agent, goal) {
            return Status::Failed;
        }
        Status::Running
    }
}

/// Signed shortest difference `to - from`, in `[-PI, PI]`.
fn yaw_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(TAU);
    if delta > PI { delta - TAU } else { delta }
}

impl ContextHandler for Rotate<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Rotate
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        if self.proto.track_target {
            return Self::track(ctx);
        }
        let Some(yaw) = ctx.sim.orientation(ctx.agent) else {
            return Status::Failed;
        };
        let sign = match self.proto.direction {
            RotateDirection::Clockwise => -1.0,
            RotateDirection::CounterClockwise => 1.0,
            RotateDirection::Random if ctx.random.chance(0.5) => -1.0,
            RotateDirection::Random => 1.0,
        };
        let goal = yaw + sign * self.proto.degrees.to_radians();
        ctx.blackboard
            .set_float(PropertyKind::AIRotateGoalYaw, goal);
        if !ctx.sim.rotate_to(ctx.agent, goal) {
            return Status::Failed;
        }
        Status::Running
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        if self.proto.track_target {
            Self::track(ctx)
        } else {
            Self::turn_toward_goal(ctx)
        }
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, _status: Status) {
    ctx.blackboard.remove_kind(PropertyKind::AIRotateGoalYaw);
}
