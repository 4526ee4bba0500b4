//! MoveTo: walk toward an entity or a point until within range.

use ai_core::prototypes::{MoveToContext, MoveToDestination};
use ai_core::{EntityId, PathResult, PropertyKind, Vector3};

use super::{ContextHandler, ContextKind, Status};
use crate::think::ThinkContext;

#[derive(Clone, Copy, Debug)]
enum Destination {
    Entity(EntityId),
    Point(Vector3),
}

pub struct MoveTo<'p> {
    pub proto: &'p MoveToContext,
    /// Result of the agent's last power use; consulted on path failure.
    pub last_power_result: Status,
}

impl<'p> MoveTo<'p> {
    pub fn new(proto: &'p MoveToContext, last_power_result: Status) -> Self {
        Self {
            proto,
            last_power_result,
        }
    }

    fn resolve(&self, ctx: &ThinkContext<'_>) -> Option<Destination> {
        match self.proto.destination {
            MoveToDestination::Target => ctx.live_target().map(Destination::Entity),
            MoveToDestination::AssistedEntity => ctx
                .blackboard_entity(PropertyKind::AIAssistedEntityId)
                .filter(|&e| ctx.sim.is_alive(e))
                .map(Destination::Entity),
            MoveToDestination::InteractEntity => ctx
                .blackboard_entity(PropertyKind::AIInteractEntityId)
                .map(Destination::Entity),
            MoveToDestination::SpawnPosition => ctx.blackboard.spawn_point.map(Destination::Point),
            MoveToDestination::DespawnPosition => {
                ctx.blackboard.despawn_point.map(Destination::Point)
            }
            MoveToDestination::PathNode => {
                let index = ctx.blackboard.get_int(PropertyKind::AIPathNodeIndex);
                usize::try_from(index)
                    .ok()
                    .and_then(|i| self.proto.path.get(i))
                    .copied()
                    .map(Destination::Point)
            }
        }
    }

    fn in_range(&self, ctx: &ThinkContext<'_>, dest: Destination) -> bool {
        match dest {
            Destination::Entity(entity) => ctx.entity_in_range(entity, self.proto.range),
            Destination::Point(point) => ctx.point_in_range(point, self.proto.range),
        }
    }

    fn has_line_of_sight(ctx: &ThinkContext<'_>, dest: Destination) -> bool {
        let point = match dest {
            Destination::Entity(entity) => ctx.sim.position(entity),
            Destination::Point(point) => Some(point),
        };
        point.is_some_and(|p| ctx.sim.line_of_sight(ctx.agent, p))
    }

    /// Issues the locomotion order. `range` overrides the configured range.
    fn issue(ctx: &mut ThinkContext<'_>, dest: Destination, range: f32) -> bool {
        match dest {
            Destination::Entity(entity) => ctx.sim.follow_entity(ctx.agent, entity, range),
            Destination::Point(point) => ctx.sim.move_to(ctx.agent, point, range),
        }
    }

    /// Whether locomotion is not already headed for `dest`. A same-kind
    /// switch may carry a different destination entity.
    fn needs_order(ctx: &ThinkContext<'_>, dest: Destination) -> bool {
        match dest {
            Destination::Entity(entity) => ctx.sim.followed_entity(ctx.agent) != Some(entity),
            Destination::Point(_) => !ctx.sim.is_moving(ctx.agent),
        }
    }

    fn path_failed(&self, ctx: &mut ThinkContext<'_>) -> Status {
        if ctx.sim.last_path_result(ctx.agent) == PathResult::FailedNoPathFound {
            reset_target_and_state_if_path_fails(ctx, self.proto, self.last_power_result);
        }
        Status::Failed
    }

    fn los_budget(&self, ctx: &ThinkContext<'_>) -> i64 {
        i64::from(
            self.proto
                .los_failure_budget
                .unwrap_or(ctx.config.los_failure_tolerance),
        )
    }

    /// Handles arrival. Returns `None` when movement continues.
    fn arrive(&self, ctx: &mut ThinkContext<'_>, dest: Destination) -> Option<Status> {
        if self.proto.enforce_line_of_sight && !Self::has_line_of_sight(ctx, dest) {
            let misses = ctx.blackboard.adjust(PropertyKind::AILosFailureCount, 1);
            if misses > self.los_budget(ctx) {
                tracing::debug!(agent = %ctx.agent, misses, "no line of sight at destination");
                return Some(Status::Failed);
            }
            // Close in further until the destination is visible.
            if !Self::issue(ctx, dest, self.proto.range * 0.5) {
                return Some(self.path_failed(ctx));
            }
            return None;
        }
        ctx.blackboard.remove_kind(PropertyKind::AILosFailureCount);

        if self.proto.destination == MoveToDestination::PathNode {
            let next = ctx.blackboard.adjust(PropertyKind::AIPathNodeIndex, 1);
            let remaining = usize::try_from(next).is_ok_and(|i| i < self.proto.path.len());
            if remaining {
                return match self.resolve(ctx) {
                    Some(next_dest) if Self::issue(ctx, next_dest, self.proto.range) => None,
                    Some(_) => Some(self.path_failed(ctx)),
                    None => Some(Status::Failed),
                };
            }
            ctx.blackboard.remove_kind(PropertyKind::AIPathNodeIndex);
        }

        if self.proto.stop_on_arrival {
            ctx.sim.stop(ctx.agent);
        }
        Some(Status::Completed)
    }
}

impl ContextHandler for MoveTo<'_> {
    fn kind(&self) -> ContextKind {
        ContextKind::MoveTo
    }

    fn validate(&self, ctx: &mut ThinkContext<'_>) -> bool {
        ctx.sim.has_locomotor(ctx.agent)
    }

    fn start(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(dest) = self.resolve(ctx) else {
            return Status::Failed;
        };
        if self.in_range(ctx, dest)
            && let Some(status) = self.arrive(ctx, dest)
        {
            return status;
        }
        if Self::needs_order(ctx, dest) && !Self::issue(ctx, dest, self.proto.range) {
            return self.path_failed(ctx);
        }
        Status::Running
    }

    fn update(&self, ctx: &mut ThinkContext<'_>) -> Status {
        let Some(dest) = self.resolve(ctx) else {
            return Status::Failed;
        };
        if ctx.sim.last_path_result(ctx.agent) == PathResult::FailedNoPathFound {
            return self.path_failed(ctx);
        }
        if self.in_range(ctx, dest) {
            if let Some(status) = self.arrive(ctx, dest) {
                return status;
            }
            return Status::Running;
        }

        if Self::needs_order(ctx, dest) && !Self::issue(ctx, dest, self.proto.range) {
            return self.path_failed(ctx);
        }
        Status::Running
    }
}

pub(super) fn end(ctx: &mut ThinkContext<'_>, _status: Status) {
    ctx.blackboard.remove_kind(PropertyKind::AILosFailureCount);
}

/// Drops the target after an unreachable path, unless `check_power` is set
/// and the agent's last power use did not fail (it can still hit from here).
///
/// # Returns
///
/// `true` when the target was cleared.
pub fn reset_target_and_state_if_path_fails(
    ctx: &mut ThinkContext<'_>,
    proto: &MoveToContext,
    last_power_result: Status,
) -> bool {
    if proto.check_power && last_power_result != Status::Failed {
        return false;
    }
    let failures = ctx.blackboard.adjust(PropertyKind::AIPathFailureCount, 1);
    if failures < i64::from(ctx.config.path_failure_tolerance) {
        return false;
    }
    tracing::debug!(agent = %ctx.agent, failures, "no path to destination, dropping target");
    ctx.blackboard.remove_kind(PropertyKind::AIPathFailureCount);
    if proto.destination == MoveToDestination::Target {
        ctx.clear_target();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use ai_core::sandbox::SandboxEntity;

    #[test]
    fn completes_when_already_in_range() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::flat(0.0, 0.0)));
        let target = h.spawn(SandboxEntity::at(Vector3::flat(5.0, 0.0)).faction(1));
        let proto = MoveToContext {
            range: 10.0,
            ..MoveToContext::default()
        };
        let status = h.with_ctx(agent, |ctx| {
            ctx.set_target(Some(target));
            MoveTo::new(&proto, Status::None).start(ctx)
        });
        assert_eq!(status, Status::Completed);
    }

    #[test]
    fn blocked_path_clears_target() {
        let mut h = Harness::new();
        let mut blocked = SandboxEntity::at(Vector3::flat(0.0, 0.0));
        blocked.path_blocked = true;
        let agent = h.spawn(blocked);
        let target = h.spawn(SandboxEntity::at(Vector3::flat(500.0, 0.0)).faction(1));
        let proto = MoveToContext::default();
        let (status, remaining) = h.with_ctx(agent, |ctx| {
            ctx.set_target(Some(target));
            let status = MoveTo::new(&proto, Status::None).start(ctx);
            (status, ctx.target())
        });
        assert_eq!(status, Status::Failed);
        assert_eq!(remaining, None);
    }

    #[test]
    fn check_power_keeps_target_after_successful_power() {
        let mut h = Harness::new();
        let mut blocked = SandboxEntity::at(Vector3::flat(0.0, 0.0));
        blocked.path_blocked = true;
        let agent = h.spawn(blocked);
        let target = h.spawn(SandboxEntity::at(Vector3::flat(500.0, 0.0)).faction(1));
        let proto = MoveToContext {
            check_power: true,
            ..MoveToContext::default()
        };
        let remaining = h.with_ctx(agent, |ctx| {
            ctx.set_target(Some(target));
            MoveTo::new(&proto, Status::Completed).start(ctx);
            ctx.target()
        });
        assert_eq!(remaining, Some(target));
    }

    #[test]
    fn update_refollows_when_the_destination_entity_changes() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::flat(0.0, 0.0)));
        let enemy = h.spawn(SandboxEntity::at(Vector3::flat(100.0, 0.0)).faction(1));
        let master = h.spawn(SandboxEntity::at(Vector3::flat(-100.0, 0.0)));
        let chase = MoveToContext {
            range: 5.0,
            ..MoveToContext::default()
        };
        let follow = MoveToContext {
            destination: MoveToDestination::AssistedEntity,
            range: 5.0,
            ..MoveToContext::default()
        };
        let followed = h.with_ctx(agent, |ctx| {
            ctx.set_target(Some(enemy));
            ctx.blackboard
                .set_entity(PropertyKind::AIAssistedEntityId, Some(master));
            assert_eq!(MoveTo::new(&chase, Status::None).start(ctx), Status::Running);
            assert_eq!(ctx.sim.followed_entity(ctx.agent), Some(enemy));
            assert_eq!(MoveTo::new(&follow, Status::None).update(ctx), Status::Running);
            ctx.sim.followed_entity(ctx.agent)
        });
        assert_eq!(followed, Some(master));
    }

    #[test]
    fn walks_path_nodes_in_order() {
        let mut h = Harness::new();
        let agent = h.spawn(
            SandboxEntity::at(Vector3::flat(0.0, 0.0))
                .speed(1000.0)
                .bounds(2.0),
        );
        let proto = MoveToContext {
            destination: MoveToDestination::PathNode,
            range: 1.0,
            path: vec![Vector3::flat(50.0, 0.0), Vector3::flat(50.0, 50.0)],
            ..MoveToContext::default()
        };
        let handler = MoveTo::new(&proto, Status::None);
        assert_eq!(h.with_ctx(agent, |ctx| handler.start(ctx)), Status::Running);
        let mut status = Status::Running;
        for _ in 0..10 {
            h.world.advance(100);
            status = h.with_ctx(agent, |ctx| handler.update(ctx));
            if status != Status::Running {
                break;
            }
        }
        assert_eq!(status, Status::Completed);
        let pos = h.world.entity(agent).map(|e| e.position);
        assert!(pos.is_some_and(|p| p.distance_2d(Vector3::flat(50.0, 50.0)) <= 3.0));
    }
}
