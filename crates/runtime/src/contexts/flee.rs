//! Flee: run away from the current target for a random duration.

use ai_core::prototypes::FleeContext;
use ai_core::{CombatTargetFlags, CombatTargetType, PropertyKind, Vector3};

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

const FLEE_ARRIVAL_RANGE: f32 = 5.0;

pub struct Flee<'p> {
    pub proto: &'p FleeContext,
}

impl<'p> Flee<'p> {
    pub fn new(proto: &'p FleeContext) -> Self {
        Self { proto }
    }

    /// Picks a point away from the threat and starts moving there.
    fn plan(&self, ctx: &mut ThinkContext<'_>) -> bool {
        let (Some(pos), Some(threat)) = (ctx.position(), ctx.target_position()) else {
            return false;
        };
        let away = (pos - threat)
            .normalize_2d()
            .unwrap_or_else(|| Vector3::from_yaw(ctx.random.range_f32(0.0, std::f32::consts::TAU)));
        let variance = self.proto.angle_variance_degrees.to_radians();
        let mut dir = away.rotate_2d(ctx.random.range_f32(-variance, variance));

        if let Some(range) = self.proto.ally_bias_range
            && let Some(ally_pos) = closest_ally(ctx, range)
            && let Some(to_ally) = (ally_pos - pos).normalize_2d()
        {
            dir = (dir + to_ally).normalize_2d().unwrap_or(dir);
        }

        let distance = ctx
            .random
            .range_f32(self.proto.distance_min, self.proto.distance_max);
        let waypoint = pos + dir * distance;
        if !ctx.sim.move_to(ctx.agent, waypoint, FLEE_ARRIVAL_RANGE) {
            return false;
        }
        ctx.blackboard.state_waypoint = Some(waypoint);
        true
    }
}

fn closest_ally(ctx: &ThinkContext<'_>, range: f32) -> Option<Vector3> {
    let pos = ctx.position()?;
    ctx.sim
        .targets_in_range(ctx.agent, range, CombatTargetType::Ally, CombatTargetFlags::empty())
        .into_iter()
        .filter_map(|ally| ctx.sim.position(ally))
        .fold(None, |best: Option<Vector3>, candidate| match best {
            Some(b) if b.distance_2d_sq(pos) <= candidate.distance_2d_sq(pos) => Some(b),
            _ => Some(candidate),
        })
}

impl ContextHandler for Flee<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::Flee
    }

    fn validate(&self, ctx: &mut ThinkContext<'_>) -> bool {
        ctx.sim.has_locomotor(ctx.agent)
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        if !self.plan(ctx) {
            return Status::Failed;
        }
        let duration = ctx.random_ms(self.proto.duration_min_ms, self.proto.duration_max_ms);
        ctx.blackboard
            .set_time(PropertyKind::AIFleeEndTime, ctx.now.plus_millis(duration));
        Status::Running
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        if ctx.now >= ctx.blackboard.get_time(PropertyKind::AIFleeEndTime) {
            return Status::Completed;
        }
        if !ctx.sim.is_moving(ctx.agent) && !self.plan(ctx) {
            // Nothing left to run from.
            return Status::Completed;
        }
        Status::Running
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, _status: Status) {
    ctx.blackboard.remove_kind(PropertyKind::AIFleeEndTime);
    ctx.blackboard.state_waypoint = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use ai_core::sandbox::SandboxEntity;

    #[test]
    fn runs_away_then_completes() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::flat(10.0, 0.0)));
        let threat = h.spawn(SandboxEntity::at(Vector3::ZERO).faction(1));
        let proto = FleeContext {
            duration_min_ms: 500,
            duration_max_ms: 500,
            angle_variance_degrees: 0.0,
            ..FleeContext::default()
        };
        let handler = Flee::new(&proto);
        let status = h.with_ctx(agent, |ctx| {
            ctx.set_target(Some(threat));
            handler.start(ctx)
        });
        assert_eq!(status, Status::Running);

        h.world.advance(300);
        assert_eq!(h.with_ctx(agent, |ctx| handler.update(ctx)), Status::Running);
        let x = h.world.entity(agent).map_or(0.0, |e| e.position.x);
        assert!(x > 10.0);

        h.world.advance(300);
        assert_eq!(h.with_ctx(agent, |ctx| handler.update(ctx)), Status::Completed);
    }

    #[test]
    fn fails_without_threat() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let proto = FleeContext::default();
        let status = h.with_ctx(agent, |ctx| Flee::new(&proto).start(ctx));
        assert_eq!(status, Status::Failed);
    }
}
