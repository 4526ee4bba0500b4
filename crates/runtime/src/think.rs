//! Per-call decision context.
//!
//! [`ThinkContext`] bundles everything one agent's `think` may touch: the
//! host world, the profile catalog, the shared random stream, engine config
//! and the agent's own blackboard and senses. It lives for exactly one call.

use ai_core::{
    AiConfig, EntityId, GameRandom, ProfileOracle, PropertyKind, Simulation, Timestamp, Vector3,
};

use crate::blackboard::Blackboard;
use crate::senses::Senses;

pub struct ThinkContext<'a> {
    /// The entity making the decision.
    pub agent: EntityId,
    /// Game time sampled once at the start of the call.
    pub now: Timestamp,
    pub sim: &'a mut dyn Simulation,
    pub prototypes: &'a dyn ProfileOracle,
    pub random: &'a mut GameRandom,
    pub config: &'a AiConfig,
    pub blackboard: &'a mut Blackboard,
    pub senses: &'a mut Senses,
}

impl<'a> ThinkContext<'a> {
    pub fn agent_alive(&self) -> bool {
        self.sim.is_alive(self.agent)
    }

    pub fn position(&self) -> Option<Vector3> {
        self.sim.position(self.agent)
    }

    /// Current target as tracked by the senses.
    pub fn target(&self) -> Option<EntityId> {
        self.senses.current_target
    }

    /// Current target, only if still alive.
    pub fn live_target(&self) -> Option<EntityId> {
        self.target().filter(|&t| self.sim.is_alive(t))
    }

    pub fn target_position(&self) -> Option<Vector3> {
        self.live_target().and_then(|t| self.sim.position(t))
    }

    /// Single mutation point for the target: senses and blackboard always
    /// change together.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        let target = target.filter(|t| t.is_valid());
        if self.senses.current_target == target {
            return;
        }
        tracing::debug!(
            agent = %self.agent,
            old = ?self.senses.current_target,
            new = ?target,
            "target changed"
        );
        self.senses.current_target = target;
        self.blackboard.set_entity(PropertyKind::AITargetId, target);
    }

    pub fn clear_target(&mut self) {
        self.set_target(None);
    }

    /// Entity stored in a blackboard slot, if it is still in the world.
    pub fn blackboard_entity(&self, kind: PropertyKind) -> Option<EntityId> {
        self.blackboard
            .get_entity(kind)
            .filter(|&e| self.sim.is_in_world(e))
    }

    /// Squared 2D distance from the agent to `entity`.
    pub fn distance_sq_to(&self, entity: EntityId) -> Option<f32> {
        let from = self.position()?;
        let to = self.sim.position(entity)?;
        Some(from.distance_2d_sq(to))
    }

    /// Whether `entity` lies within `range` of the agent, bounds included.
    pub fn entity_in_range(&self, entity: EntityId, range: f32) -> bool {
        let reach = range + self.sim.bounds_radius(self.agent) + self.sim.bounds_radius(entity);
        self.distance_sq_to(entity)
            .is_some_and(|dist_sq| dist_sq <= reach * reach)
    }

    /// Whether `point` lies within `range` of the agent, agent bounds included.
    pub fn point_in_range(&self, point: Vector3, range: f32) -> bool {
        let reach = range + self.sim.bounds_radius(self.agent);
        self.position()
            .is_some_and(|pos| pos.distance_2d_sq(point) <= reach * reach)
    }

    /// Uniform duration in `[min, max]` milliseconds.
    pub fn random_ms(&mut self, min: u64, max: u64) -> u64 {
        self.random.range_u64(min, max)
    }
}
