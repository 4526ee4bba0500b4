//! Deterministic in-memory world implementing every capability trait.
//!
//! Used by the runtime's tests and by the replay harness. Movement is a
//! straight line at constant speed, powers run for a fixed duration, and
//! every side effect requested by the AI is appended to a command log that
//! can be compared (or hashed) across runs.

use std::collections::BTreeMap;
use std::fmt;

use crate::properties::PropertyCollection;
use crate::types::{
    DifficultyTier, EntityId, Health, KeywordId, PowerRef, PrototypeId, RegionId, Timestamp,
    Vector3,
};
use crate::world::{
    Combat, EntityWorld, Locomotion, PathResult, PowerUseResult, Powers, SpawnerAction,
};

/// A power granted to a sandbox entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SandboxPower {
    pub power: PowerRef,
    pub range: f32,
    /// Zero completes instantly.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_ms: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown_ms: u64,
}

impl SandboxPower {
    pub const fn instant(power: PowerRef, range: f32) -> Self {
        Self {
            power,
            range,
            duration_ms: 0,
            cooldown_ms: 0,
        }
    }

    pub const fn channeled(power: PowerRef, range: f32, duration_ms: u64) -> Self {
        Self {
            power,
            range,
            duration_ms,
            cooldown_ms: 0,
        }
    }
}

#[derive(Clone, Debug)]
struct Executing {
    power: PowerRef,
    ends_at: Timestamp,
}

/// Entity record. Build with [`SandboxEntity::at`] and the chained setters.
#[derive(Clone, Debug)]
pub struct SandboxEntity {
    pub position: Vector3,
    pub yaw: f32,
    pub bounds_radius: f32,
    pub region: RegionId,
    pub prototype: PrototypeId,
    pub keywords: Vec<KeywordId>,
    /// Entities of different factions are hostile to each other.
    pub faction: u32,
    pub avatar: bool,
    pub melee: bool,
    pub health: Health,
    pub dead: bool,
    pub spawner: bool,
    pub locomotor: bool,
    /// Units per second.
    pub speed: f32,
    pub properties: PropertyCollection,
    pub powers: Vec<SandboxPower>,
    pub affix_powers: Vec<PowerRef>,
    /// Every path request from this entity fails with `FailedNoPathFound`.
    pub path_blocked: bool,
    destination: Option<(Vector3, f32)>,
    following: Option<(EntityId, f32)>,
    path_result: PathResult,
    executing: Option<Executing>,
}

impl SandboxEntity {
    pub fn at(position: Vector3) -> Self {
        Self {
            position,
            yaw: 0.0,
            bounds_radius: 0.0,
            region: RegionId(1),
            prototype: PrototypeId(0),
            keywords: Vec::new(),
            faction: 0,
            avatar: false,
            melee: true,
            health: Health::new(100.0, 100.0),
            dead: false,
            spawner: false,
            locomotor: true,
            speed: 100.0,
            properties: PropertyCollection::new(),
            powers: Vec::new(),
            affix_powers: Vec::new(),
            path_blocked: false,
            destination: None,
            following: None,
            path_result: PathResult::None,
            executing: None,
        }
    }

    pub fn faction(mut self, faction: u32) -> Self {
        self.faction = faction;
        self
    }

    pub fn avatar(mut self) -> Self {
        self.avatar = true;
        self
    }

    pub fn ranged(mut self) -> Self {
        self.melee = false;
        self
    }

    pub fn health(mut self, current: f32, maximum: f32) -> Self {
        self.health = Health::new(current, maximum);
        self
    }

    pub fn keyword(mut self, keyword: KeywordId) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn prototype(mut self, prototype: PrototypeId) -> Self {
        self.prototype = prototype;
        self
    }

    pub fn spawner(mut self) -> Self {
        self.spawner = true;
        self.locomotor = false;
        self
    }

    pub fn stationary(mut self) -> Self {
        self.locomotor = false;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn bounds(mut self, radius: f32) -> Self {
        self.bounds_radius = radius;
        self
    }

    pub fn power(mut self, power: SandboxPower) -> Self {
        self.powers.push(power);
        self
    }

    pub fn affix_power(mut self, power: SandboxPower) -> Self {
        self.affix_powers.push(power.power);
        self.powers.push(power);
        self
    }

    fn find_power(&self, power: PowerRef) -> Option<&SandboxPower> {
        self.powers.iter().find(|p| p.power == power)
    }
}

/// Side effect requested through a capability trait.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldCommand {
    MoveTo { entity: EntityId, destination: Vector3 },
    Follow { entity: EntityId, target: EntityId },
    Stop { entity: EntityId },
    Rotate { entity: EntityId, yaw: f32 },
    ActivatePower { entity: EntityId, power: PowerRef, target: Option<EntityId> },
    EndPower { entity: EntityId, power: PowerRef },
    TriggerSpawner { spawner: EntityId, action: SpawnerAction },
    Interact { entity: EntityId, target: EntityId },
    Destroy { entity: EntityId },
    Kill { entity: EntityId },
    Teleport { entity: EntityId, position: Vector3 },
}

impl fmt::Display for WorldCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldCommand::MoveTo { entity, destination } => write!(
                f,
                "{entity} move_to ({:.2},{:.2})",
                destination.x, destination.y
            ),
            WorldCommand::Follow { entity, target } => write!(f, "{entity} follow {target}"),
            WorldCommand::Stop { entity } => write!(f, "{entity} stop"),
            WorldCommand::Rotate { entity, yaw } => write!(f, "{entity} rotate {yaw:.3}"),
            WorldCommand::ActivatePower {
                entity,
                power,
                target,
            } => match target {
                Some(target) => write!(f, "{entity} activate {power} -> {target}"),
                None => write!(f, "{entity} activate {power}"),
            },
            WorldCommand::EndPower { entity, power } => write!(f, "{entity} end {power}"),
            WorldCommand::TriggerSpawner { spawner, action } => {
                write!(f, "{spawner} spawner {action}")
            }
            WorldCommand::Interact { entity, target } => write!(f, "{entity} interact {target}"),
            WorldCommand::Destroy { entity } => write!(f, "{entity} destroy"),
            WorldCommand::Kill { entity } => write!(f, "{entity} kill"),
            WorldCommand::Teleport { entity, position } => write!(
                f,
                "{entity} teleport ({:.2},{:.2})",
                position.x, position.y
            ),
        }
    }
}

/// Circular obstacle blocking line of sight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Occluder {
    pub center: Vector3,
    pub radius: f32,
}

#[derive(Clone, Debug, Default)]
pub struct SandboxWorld {
    now: Timestamp,
    next_id: u64,
    entities: BTreeMap<EntityId, SandboxEntity>,
    cooldowns: BTreeMap<(EntityId, PowerRef), Timestamp>,
    damage: Vec<(EntityId, EntityId, f32, Timestamp)>,
    occluders: Vec<Occluder>,
    difficulty: DifficultyTier,
    log: Vec<(Timestamp, WorldCommand)>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn spawn(&mut self, entity: SandboxEntity) -> EntityId {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.entities.insert(id, entity);
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&SandboxEntity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut SandboxEntity> {
        self.entities.get_mut(&id)
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn set_difficulty(&mut self, tier: DifficultyTier) {
        self.difficulty = tier;
    }

    pub fn add_occluder(&mut self, occluder: Occluder) {
        self.occluders.push(occluder);
    }

    pub fn set_health(&mut self, id: EntityId, current: f32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.health.current = current.clamp(0.0, entity.health.maximum);
        }
    }

    pub fn record_damage(&mut self, attacker: EntityId, victim: EntityId, amount: f32) {
        self.damage.push((attacker, victim, amount, self.now));
    }

    pub fn command_log(&self) -> &[(Timestamp, WorldCommand)] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Advances the clock, moving entities and finishing powers.
    pub fn advance(&mut self, ms: u64) {
        self.now = self.now.plus_millis(ms);
        let dt = ms as f32 / 1000.0;

        let follow_targets: Vec<(EntityId, Option<Vector3>)> = self
            .entities
            .iter()
            .filter_map(|(&id, e)| {
                e.following
                    .map(|(target, _)| (id, self.entities.get(&target).map(|t| t.position)))
            })
            .collect();
        for (id, target_pos) in follow_targets {
            if let Some(entity) = self.entities.get_mut(&id) {
                match (target_pos, entity.following) {
                    (Some(pos), Some((_, range))) => entity.destination = Some((pos, range)),
                    _ => {
                        entity.following = None;
                        entity.destination = None;
                    }
                }
            }
        }

        let now = self.now;
        for entity in self.entities.values_mut() {
            if let Some(exec) = &entity.executing
                && exec.ends_at <= now
            {
                entity.executing = None;
            }
            let Some((dest, range)) = entity.destination else {
                continue;
            };
            let to_dest = dest - entity.position;
            let dist = to_dest.length_2d_sq().sqrt();
            if dist <= range.max(0.01) {
                if entity.following.is_none() {
                    entity.destination = None;
                }
                entity.path_result = PathResult::Success;
                continue;
            }
            let step = (entity.speed * dt).min(dist - range.max(0.0));
            if let Some(dir) = to_dest.normalize_2d() {
                entity.position += dir * step;
                entity.yaw = dir.yaw();
            }
        }
    }

    fn push(&mut self, command: WorldCommand) {
        tracing::trace!(%command, "sandbox command");
        self.log.push((self.now, command));
    }

    fn segment_blocked(&self, from: Vector3, to: Vector3) -> bool {
        let seg = to - from;
        let len_sq = seg.length_2d_sq();
        self.occluders.iter().any(|occ| {
            let t = if len_sq <= f32::EPSILON {
                0.0
            } else {
                (((occ.center.x - from.x) * seg.x + (occ.center.y - from.y) * seg.y) / len_sq)
                    .clamp(0.0, 1.0)
            };
            let closest = from + seg * t;
            closest.distance_2d_sq(occ.center) < occ.radius * occ.radius
        })
    }
}

impl EntityWorld for SandboxWorld {
    fn game_time(&self) -> Timestamp {
        self.now
    }

    fn is_in_world(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    fn is_dead(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.dead)
    }

    fn position(&self, entity: EntityId) -> Option<Vector3> {
        self.entities.get(&entity).map(|e| e.position)
    }

    fn orientation(&self, entity: EntityId) -> Option<f32> {
        self.entities.get(&entity).map(|e| e.yaw)
    }

    fn bounds_radius(&self, entity: EntityId) -> f32 {
        self.entities.get(&entity).map_or(0.0, |e| e.bounds_radius)
    }

    fn region(&self, entity: EntityId) -> Option<RegionId> {
        self.entities.get(&entity).map(|e| e.region)
    }

    fn prototype(&self, entity: EntityId) -> Option<PrototypeId> {
        self.entities.get(&entity).map(|e| e.prototype)
    }

    fn has_keyword(&self, entity: EntityId, keyword: KeywordId) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|e| e.keywords.contains(&keyword))
    }

    fn is_hostile(&self, entity: EntityId, other: EntityId) -> bool {
        match (self.entities.get(&entity), self.entities.get(&other)) {
            (Some(a), Some(b)) => a.faction != b.faction,
            _ => false,
        }
    }

    fn is_avatar(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.avatar)
    }

    fn is_melee(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.melee)
    }

    fn health(&self, entity: EntityId) -> Option<Health> {
        self.entities.get(&entity).map(|e| e.health)
    }

    fn line_of_sight(&self, entity: EntityId, target: Vector3) -> bool {
        self.position(entity)
            .is_some_and(|from| !self.segment_blocked(from, target))
    }

    fn entities_in_range(&self, center: Vector3, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        self.entities
            .iter()
            .filter(|(_, e)| e.position.distance_2d_sq(center) <= radius_sq)
            .map(|(&id, _)| id)
            .collect()
    }

    fn entities_in_region(&self, region: RegionId) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.region == region)
            .map(|(&id, _)| id)
            .collect()
    }

    fn properties(&self, entity: EntityId) -> Option<&PropertyCollection> {
        self.entities.get(&entity).map(|e| &e.properties)
    }

    fn properties_mut(&mut self, entity: EntityId) -> Option<&mut PropertyCollection> {
        self.entities.get_mut(&entity).map(|e| &mut e.properties)
    }

    fn difficulty_tier(&self) -> DifficultyTier {
        self.difficulty
    }

    fn damage_dealt(&self, attacker: EntityId, victim: EntityId, since: Timestamp) -> f32 {
        self.damage
            .iter()
            .filter(|(a, v, _, at)| *a == attacker && *v == victim && *at >= since)
            .map(|(_, _, amount, _)| amount)
            .sum()
    }

    fn is_spawner(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(|e| e.spawner)
    }

    fn trigger_spawner(&mut self, spawner: EntityId, action: SpawnerAction) -> bool {
        if !self.is_spawner(spawner) {
            return false;
        }
        self.push(WorldCommand::TriggerSpawner { spawner, action });
        true
    }

    fn interact(&mut self, entity: EntityId, target: EntityId) -> bool {
        if !self.is_in_world(entity) || !self.is_in_world(target) {
            return false;
        }
        self.push(WorldCommand::Interact { entity, target });
        true
    }

    fn destroy(&mut self, entity: EntityId) -> bool {
        if self.entities.remove(&entity).is_none() {
            return false;
        }
        self.push(WorldCommand::Destroy { entity });
        true
    }

    fn kill(&mut self, entity: EntityId, _killer: Option<EntityId>) -> bool {
        let Some(record) = self.entities.get_mut(&entity) else {
            return false;
        };
        if record.dead {
            return false;
        }
        record.dead = true;
        record.health.current = 0.0;
        record.destination = None;
        record.following = None;
        record.executing = None;
        self.push(WorldCommand::Kill { entity });
        true
    }

    fn teleport(&mut self, entity: EntityId, position: Vector3) -> bool {
        let Some(record) = self.entities.get_mut(&entity) else {
            return false;
        };
        record.position = position;
        record.destination = None;
        self.push(WorldCommand::Teleport { entity, position });
        true
    }
}

impl Locomotion for SandboxWorld {
    fn has_locomotor(&self, entity: EntityId) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|e| e.locomotor && !e.dead)
    }

    fn move_to(&mut self, entity: EntityId, destination: Vector3, range: f32) -> bool {
        if !self.has_locomotor(entity) {
            return false;
        }
        let Some(record) = self.entities.get_mut(&entity) else {
            return false;
        };
        record.following = None;
        if record.path_blocked {
            record.destination = None;
            record.path_result = PathResult::FailedNoPathFound;
            return false;
        }
        record.destination = Some((destination, range));
        record.path_result = PathResult::Success;
        self.push(WorldCommand::MoveTo {
            entity,
            destination,
        });
        true
    }

    fn follow_entity(&mut self, entity: EntityId, target: EntityId, range: f32) -> bool {
        if !self.has_locomotor(entity) {
            return false;
        }
        let Some(target_pos) = self.position(target) else {
            return false;
        };
        let Some(record) = self.entities.get_mut(&entity) else {
            return false;
        };
        if record.path_blocked {
            record.path_result = PathResult::FailedNoPathFound;
            return false;
        }
        record.following = Some((target, range));
        record.destination = Some((target_pos, range));
        record.path_result = PathResult::Success;
        self.push(WorldCommand::Follow { entity, target });
        true
    }

    fn stop(&mut self, entity: EntityId) {
        let Some(record) = self.entities.get_mut(&entity) else {
            return;
        };
        if record.destination.is_none() && record.following.is_none() {
            return;
        }
        record.destination = None;
        record.following = None;
        self.push(WorldCommand::Stop { entity });
    }

    fn look_at(&mut self, entity: EntityId, position: Vector3) {
        let Some(from) = self.position(entity) else {
            return;
        };
        let yaw = (position - from).yaw();
        self.rotate_to(entity, yaw);
    }

    fn rotate_to(&mut self, entity: EntityId, yaw: f32) -> bool {
        let Some(record) = self.entities.get_mut(&entity) else {
            return false;
        };
        if (record.yaw - yaw).abs() <= f32::EPSILON {
            return true;
        }
        record.yaw = yaw;
        self.push(WorldCommand::Rotate { entity, yaw });
        true
    }

    fn is_moving(&self, entity: EntityId) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|e| e.destination.is_some())
    }

    fn followed_entity(&self, entity: EntityId) -> Option<EntityId> {
        self.entities
            .get(&entity)
            .and_then(|e| e.following)
            .map(|(target, _)| target)
    }

    fn last_path_result(&self, entity: EntityId) -> PathResult {
        self.entities
            .get(&entity)
            .map_or(PathResult::None, |e| e.path_result)
    }
}

impl Combat for SandboxWorld {}

impl Powers for SandboxWorld {
    fn has_power(&self, agent: EntityId, power: PowerRef) -> bool {
        self.entities
            .get(&agent)
            .is_some_and(|e| e.find_power(power).is_some())
    }

    fn power_range(&self, agent: EntityId, power: PowerRef) -> Option<f32> {
        self.entities
            .get(&agent)
            .and_then(|e| e.find_power(power))
            .map(|p| p.range)
    }

    fn can_activate_power(
        &self,
        agent: EntityId,
        power: PowerRef,
        target: Option<EntityId>,
        target_position: Vector3,
    ) -> PowerUseResult {
        let Some(entity) = self.entities.get(&agent) else {
            return PowerUseResult::InvalidTarget;
        };
        let Some(granted) = entity.find_power(power) else {
            return PowerUseResult::PowerNotFound;
        };
        if entity.dead {
            return PowerUseResult::RestrictiveCondition;
        }
        if entity.executing.as_ref().is_some_and(|e| e.ends_at > self.now) {
            return PowerUseResult::AlreadyActive;
        }
        if self.cooldown_remaining(agent, power) > 0 {
            return PowerUseResult::Cooldown;
        }
        if let Some(target) = target
            && target != agent
            && !self.is_alive(target)
        {
            return PowerUseResult::InvalidTarget;
        }
        let reach = granted.range + entity.bounds_radius + self.bounds_of(target);
        if entity.position.distance_2d_sq(target_position) > reach * reach {
            return PowerUseResult::OutOfRange;
        }
        PowerUseResult::Success
    }

    fn activate_power(
        &mut self,
        agent: EntityId,
        power: PowerRef,
        target: Option<EntityId>,
        target_position: Vector3,
    ) -> PowerUseResult {
        let result = self.can_activate_power(agent, power, target, target_position);
        if !result.is_success() {
            return result;
        }
        let now = self.now;
        let Some(entity) = self.entities.get_mut(&agent) else {
            return PowerUseResult::InvalidTarget;
        };
        let Some(granted) = entity.find_power(power).cloned() else {
            return PowerUseResult::PowerNotFound;
        };
        if granted.duration_ms > 0 {
            entity.executing = Some(Executing {
                power,
                ends_at: now.plus_millis(granted.duration_ms),
            });
        }
        if granted.cooldown_ms > 0 {
            self.cooldowns
                .insert((agent, power), now.plus_millis(granted.cooldown_ms));
        }
        self.push(WorldCommand::ActivatePower {
            entity: agent,
            power,
            target,
        });
        PowerUseResult::Success
    }

    fn cooldown_remaining(&self, agent: EntityId, power: PowerRef) -> u64 {
        self.cooldowns
            .get(&(agent, power))
            .map_or(0, |until| self.now.millis_until(*until))
    }

    fn executing_power(&self, agent: EntityId) -> Option<PowerRef> {
        self.entities
            .get(&agent)
            .and_then(|e| e.executing.as_ref())
            .filter(|exec| exec.ends_at > self.now)
            .map(|exec| exec.power)
    }

    fn end_power(&mut self, agent: EntityId, power: PowerRef) -> bool {
        let Some(entity) = self.entities.get_mut(&agent) else {
            return false;
        };
        if entity.executing.as_ref().is_none_or(|e| e.power != power) {
            return false;
        }
        entity.executing = None;
        self.push(WorldCommand::EndPower {
            entity: agent,
            power,
        });
        true
    }

    fn affix_powers(&self, agent: EntityId) -> Vec<PowerRef> {
        self.entities
            .get(&agent)
            .map(|e| e.affix_powers.clone())
            .unwrap_or_default()
    }
}

impl SandboxWorld {
    fn bounds_of(&self, entity: Option<EntityId>) -> f32 {
        entity.map_or(0.0, |id| self.bounds_radius(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{CombatTargetFlags, CombatTargetType};

    #[test]
    fn movement_arrives_within_range() {
        let mut world = SandboxWorld::new();
        let id = world.spawn(SandboxEntity::at(Vector3::ZERO).speed(100.0));
        assert!(world.move_to(id, Vector3::flat(100.0, 0.0), 10.0));
        world.advance(500);
        assert!(world.is_moving(id));
        world.advance(500);
        world.advance(100);
        assert!(!world.is_moving(id));
        let pos = world.position(id).unwrap();
        assert!((pos.x - 90.0).abs() < 0.01);
    }

    #[test]
    fn blocked_path_reports_no_path() {
        let mut world = SandboxWorld::new();
        let mut entity = SandboxEntity::at(Vector3::ZERO);
        entity.path_blocked = true;
        let id = world.spawn(entity);
        assert!(!world.move_to(id, Vector3::flat(50.0, 0.0), 0.0));
        assert_eq!(world.last_path_result(id), PathResult::FailedNoPathFound);
    }

    #[test]
    fn follow_tracks_the_latest_target() {
        let mut world = SandboxWorld::new();
        let id = world.spawn(SandboxEntity::at(Vector3::ZERO));
        let first = world.spawn(SandboxEntity::at(Vector3::flat(50.0, 0.0)));
        let second = world.spawn(SandboxEntity::at(Vector3::flat(-50.0, 0.0)));
        assert_eq!(world.followed_entity(id), None);
        assert!(world.follow_entity(id, first, 5.0));
        assert_eq!(world.followed_entity(id), Some(first));
        assert!(world.follow_entity(id, second, 5.0));
        assert_eq!(world.followed_entity(id), Some(second));
        world.stop(id);
        assert_eq!(world.followed_entity(id), None);
    }

    #[test]
    fn channeled_power_executes_then_finishes() {
        let mut world = SandboxWorld::new();
        let power = PowerRef(7);
        let agent = world.spawn(
            SandboxEntity::at(Vector3::ZERO).power(SandboxPower::channeled(power, 50.0, 300)),
        );
        let target = world.spawn(SandboxEntity::at(Vector3::flat(20.0, 0.0)).faction(1));
        let pos = world.position(target).unwrap();
        assert!(world.activate_power(agent, power, Some(target), pos).is_success());
        assert_eq!(world.executing_power(agent), Some(power));
        assert_eq!(
            world.can_activate_power(agent, power, Some(target), pos),
            PowerUseResult::AlreadyActive
        );
        world.advance(300);
        assert_eq!(world.executing_power(agent), None);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut world = SandboxWorld::new();
        let power = PowerRef(1);
        let agent = world.spawn(SandboxEntity::at(Vector3::ZERO).power(SandboxPower::instant(power, 10.0)));
        let target = world.spawn(SandboxEntity::at(Vector3::flat(50.0, 0.0)).faction(1));
        let pos = world.position(target).unwrap();
        assert_eq!(
            world.can_activate_power(agent, power, Some(target), pos),
            PowerUseResult::OutOfRange
        );
    }

    #[test]
    fn occluder_blocks_sight_and_filters_targets() {
        let mut world = SandboxWorld::new();
        let agent = world.spawn(SandboxEntity::at(Vector3::ZERO));
        let hidden = world.spawn(SandboxEntity::at(Vector3::flat(100.0, 0.0)).faction(1));
        let visible = world.spawn(SandboxEntity::at(Vector3::flat(0.0, 150.0)).faction(1));
        world.add_occluder(Occluder {
            center: Vector3::flat(50.0, 0.0),
            radius: 5.0,
        });
        assert!(!world.line_of_sight(agent, Vector3::flat(100.0, 0.0)));
        assert_eq!(
            world.closest_valid_hostile_target(agent, 500.0, CombatTargetFlags::empty()),
            Some(hidden)
        );
        assert_eq!(
            world.closest_valid_hostile_target(
                agent,
                500.0,
                CombatTargetFlags::CHECK_LINE_OF_SIGHT
            ),
            Some(visible)
        );
        assert_eq!(
            world.num_targets_in_range(
                agent,
                500.0,
                CombatTargetType::Ally,
                CombatTargetFlags::empty()
            ),
            0
        );
    }

    #[test]
    fn kill_leaves_corpse_destroy_removes() {
        let mut world = SandboxWorld::new();
        let a = world.spawn(SandboxEntity::at(Vector3::ZERO));
        let b = world.spawn(SandboxEntity::at(Vector3::ZERO));
        assert!(world.kill(a, None));
        assert!(world.is_in_world(a));
        assert!(!world.is_alive(a));
        assert!(world.destroy(b));
        assert!(!world.is_in_world(b));
        assert_eq!(world.command_log().len(), 2);
    }
}
