//! Capability traits the decision engine consumes.
//!
//! The engine never owns world state. Everything it reads or changes goes
//! through these narrow interfaces, implemented by the host simulation (or
//! by [`crate::sandbox::SandboxWorld`] in tests and the replay harness).
//! All queries take the querying agent explicitly and degrade to `None`,
//! `false` or empty when an entity is unknown.

use bitflags::bitflags;

use crate::properties::PropertyCollection;
use crate::prototypes::ProfilePrototype;
use crate::types::{
    DifficultyTier, EntityId, Health, KeywordId, PowerRef, ProfileRef, PrototypeId, RegionId,
    Timestamp, Vector3,
};

/// Outcome of the most recent locomotion request for an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathResult {
    /// No request issued yet.
    #[default]
    None,
    Success,
    /// The destination cannot be reached at all.
    FailedNoPathFound,
    /// The request was issued but could not be followed (blocked, stuck).
    Failed,
}

/// Verdict of a power activation check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerUseResult {
    Success,
    OutOfRange,
    Cooldown,
    RestrictiveCondition,
    NoLineOfSight,
    AlreadyActive,
    PowerNotFound,
    InvalidTarget,
}

impl PowerUseResult {
    pub const fn is_success(self) -> bool {
        matches!(self, PowerUseResult::Success)
    }
}

/// What a spawner should do when triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpawnerAction {
    #[default]
    Activate,
    Deactivate,
    /// Spawn one wave immediately.
    Pulse,
}

/// Relationship a candidate must have with the agent to count as a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatTargetType {
    #[default]
    Hostile,
    Ally,
}

bitflags! {
    /// Extra constraints applied by [`Combat::valid_target`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CombatTargetFlags: u8 {
        /// Candidate must be visible from the agent.
        const CHECK_LINE_OF_SIGHT = 1 << 0;
        /// Only player avatars qualify.
        const AVATARS_ONLY = 1 << 1;
        /// Player avatars never qualify.
        const IGNORE_AVATARS = 1 << 2;
        /// Dead entities still in the world qualify.
        const INCLUDE_DEAD = 1 << 3;
    }
}

/// Entity and world state queries plus one-shot side effects.
pub trait EntityWorld {
    fn game_time(&self) -> Timestamp;

    fn is_in_world(&self, entity: EntityId) -> bool;
    fn is_dead(&self, entity: EntityId) -> bool;

    /// In the world and not dead.
    fn is_alive(&self, entity: EntityId) -> bool {
        self.is_in_world(entity) && !self.is_dead(entity)
    }

    fn position(&self, entity: EntityId) -> Option<Vector3>;
    /// Facing as a yaw in radians.
    fn orientation(&self, entity: EntityId) -> Option<f32>;
    fn bounds_radius(&self, entity: EntityId) -> f32;
    fn region(&self, entity: EntityId) -> Option<RegionId>;
    fn prototype(&self, entity: EntityId) -> Option<PrototypeId>;
    fn has_keyword(&self, entity: EntityId, keyword: KeywordId) -> bool;
    fn is_hostile(&self, entity: EntityId, other: EntityId) -> bool;
    fn is_avatar(&self, entity: EntityId) -> bool;
    fn is_melee(&self, entity: EntityId) -> bool;
    fn health(&self, entity: EntityId) -> Option<Health>;

    /// Unobstructed line from `entity` to `target`.
    fn line_of_sight(&self, entity: EntityId, target: Vector3) -> bool;

    /// Entities whose position lies within `radius` of `center`, in a stable
    /// order (ascending id).
    fn entities_in_range(&self, center: Vector3, radius: f32) -> Vec<EntityId>;
    fn entities_in_region(&self, region: RegionId) -> Vec<EntityId>;

    fn properties(&self, entity: EntityId) -> Option<&PropertyCollection>;
    fn properties_mut(&mut self, entity: EntityId) -> Option<&mut PropertyCollection>;

    fn difficulty_tier(&self) -> DifficultyTier;

    /// Damage `attacker` dealt to `victim` since `since`.
    fn damage_dealt(&self, attacker: EntityId, victim: EntityId, since: Timestamp) -> f32;

    fn is_spawner(&self, entity: EntityId) -> bool;
    fn trigger_spawner(&mut self, spawner: EntityId, action: SpawnerAction) -> bool;
    fn interact(&mut self, entity: EntityId, target: EntityId) -> bool;
    /// Removes the entity without death.
    fn destroy(&mut self, entity: EntityId) -> bool;
    fn kill(&mut self, entity: EntityId, killer: Option<EntityId>) -> bool;
    fn teleport(&mut self, entity: EntityId, position: Vector3) -> bool;
}

/// Movement requests. Pathfinding itself belongs to the host.
pub trait Locomotion {
    fn has_locomotor(&self, entity: EntityId) -> bool;

    /// Starts moving toward `destination`, arriving within `range`.
    fn move_to(&mut self, entity: EntityId, destination: Vector3, range: f32) -> bool;
    fn follow_entity(&mut self, entity: EntityId, target: EntityId, range: f32) -> bool;
    fn stop(&mut self, entity: EntityId);
    fn look_at(&mut self, entity: EntityId, position: Vector3);
    fn rotate_to(&mut self, entity: EntityId, yaw: f32) -> bool;
    fn is_moving(&self, entity: EntityId) -> bool;
    /// The entity `entity` is currently following, if any.
    fn followed_entity(&self, entity: EntityId) -> Option<EntityId>;
    fn last_path_result(&self, entity: EntityId) -> PathResult;
}

/// Combat-level target queries built on [`EntityWorld`].
pub trait Combat: EntityWorld {
    /// Whether `candidate` is an acceptable target for `agent`.
    fn valid_target(
        &self,
        agent: EntityId,
        candidate: EntityId,
        target_type: CombatTargetType,
        flags: CombatTargetFlags,
    ) -> bool {
        if candidate == agent || !self.is_in_world(candidate) {
            return false;
        }
        if self.is_dead(candidate) && !flags.contains(CombatTargetFlags::INCLUDE_DEAD) {
            return false;
        }
        let hostile = self.is_hostile(agent, candidate);
        match target_type {
            CombatTargetType::Hostile if !hostile => return false,
            CombatTargetType::Ally if hostile => return false,
            _ => {}
        }
        let avatar = self.is_avatar(candidate);
        if flags.contains(CombatTargetFlags::AVATARS_ONLY) && !avatar {
            return false;
        }
        if flags.contains(CombatTargetFlags::IGNORE_AVATARS) && avatar {
            return false;
        }
        if flags.contains(CombatTargetFlags::CHECK_LINE_OF_SIGHT) {
            match self.position(candidate) {
                Some(pos) if self.line_of_sight(agent, pos) => {}
                _ => return false,
            }
        }
        true
    }

    /// Valid targets within `range` of the agent, in stable order.
    fn targets_in_range(
        &self,
        agent: EntityId,
        range: f32,
        target_type: CombatTargetType,
        flags: CombatTargetFlags,
    ) -> Vec<EntityId> {
        let Some(center) = self.position(agent) else {
            return Vec::new();
        };
        self.entities_in_range(center, range)
            .into_iter()
            .filter(|&candidate| self.valid_target(agent, candidate, target_type, flags))
            .collect()
    }

    fn num_targets_in_range(
        &self,
        agent: EntityId,
        range: f32,
        target_type: CombatTargetType,
        flags: CombatTargetFlags,
    ) -> usize {
        self.targets_in_range(agent, range, target_type, flags)
            .len()
    }

    /// Closest valid hostile within `range`. Ties keep the first candidate
    /// in iteration order.
    fn closest_valid_hostile_target(
        &self,
        agent: EntityId,
        range: f32,
        flags: CombatTargetFlags,
    ) -> Option<EntityId> {
        let center = self.position(agent)?;
        let mut best: Option<(EntityId, f32)> = None;
        for candidate in self.targets_in_range(agent, range, CombatTargetType::Hostile, flags) {
            let Some(pos) = self.position(candidate) else {
                continue;
            };
            let dist = center.distance_2d_sq(pos);
            if best.is_none_or(|(_, best_dist)| dist < best_dist) {
                best = Some((candidate, dist));
            }
        }
        best.map(|(entity, _)| entity)
    }
}

/// Power (ability) system.
pub trait Powers {
    fn has_power(&self, agent: EntityId, power: PowerRef) -> bool;
    fn power_range(&self, agent: EntityId, power: PowerRef) -> Option<f32>;

    fn can_activate_power(
        &self,
        agent: EntityId,
        power: PowerRef,
        target: Option<EntityId>,
        target_position: Vector3,
    ) -> PowerUseResult;

    fn activate_power(
        &mut self,
        agent: EntityId,
        power: PowerRef,
        target: Option<EntityId>,
        target_position: Vector3,
    ) -> PowerUseResult;

    fn cooldown_remaining(&self, agent: EntityId, power: PowerRef) -> u64;

    /// Power the agent is currently executing, if any.
    fn executing_power(&self, agent: EntityId) -> Option<PowerRef>;
    fn end_power(&mut self, agent: EntityId, power: PowerRef) -> bool;

    /// Powers granted by the agent's affixes, in grant order.
    fn affix_powers(&self, agent: EntityId) -> Vec<PowerRef>;
}

/// Everything a controller needs from the host.
pub trait Simulation: EntityWorld + Locomotion + Combat + Powers {}

impl<T> Simulation for T where T: EntityWorld + Locomotion + Combat + Powers + ?Sized {}

/// Read-only profile catalog.
pub trait ProfileOracle: Send + Sync {
    fn profile(&self, profile: ProfileRef) -> Option<&ProfilePrototype>;
}
