//! Scenario replay in the sandbox world.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use ai_content::{ProfileRegistry, Scenario, ScenarioEntity, ScenarioEventKind};
use ai_core::sandbox::{SandboxEntity, SandboxWorld};
use ai_core::{AiConfig, DifficultyTier, EntityId, EntityWorld, GameRandom, Health};
use ai_runtime::{AiController, AiEnv, Interrupt};

pub struct Replay {
    scenario: Scenario,
    world: SandboxWorld,
    registry: ProfileRegistry,
    config: AiConfig,
    random: GameRandom,
    names: BTreeMap<String, EntityId>,
    controllers: BTreeMap<EntityId, AiController>,
}

fn sandbox_entity(def: &ScenarioEntity) -> SandboxEntity {
    let mut entity = SandboxEntity::at(def.position).faction(def.faction);
    if def.avatar {
        entity = entity.avatar();
    }
    if def.ranged {
        entity = entity.ranged();
    }
    if def.spawner {
        entity = entity.spawner();
    }
    if def.stationary {
        entity = entity.stationary();
    }
    if let Some(health) = def.health {
        entity = entity.health(health, health);
    }
    if let Some(speed) = def.speed {
        entity = entity.speed(speed);
    }
    if let Some(prototype) = def.prototype {
        entity = entity.prototype(prototype);
    }
    entity = entity.bounds(def.bounds);
    for &keyword in &def.keywords {
        entity = entity.keyword(keyword);
    }
    for power in &def.powers {
        entity = entity.power(power.clone());
    }
    for power in &def.affix_powers {
        entity = entity.affix_power(power.clone());
    }
    entity.path_blocked = def.path_blocked;
    entity
}

impl Replay {
    /// Spawns every scenario entity and a controller for each one with a
    /// profile.
    pub fn new(scenario: Scenario, registry: ProfileRegistry, config: AiConfig) -> Result<Self> {
        let mut world = SandboxWorld::new();
        world.set_difficulty(DifficultyTier(scenario.difficulty));

        let mut names = BTreeMap::new();
        for def in &scenario.entities {
            let id = world.spawn(sandbox_entity(def));
            names.insert(def.name.clone(), id);
        }

        let mut controllers = BTreeMap::new();
        for def in &scenario.entities {
            let Some(profile_name) = &def.profile else {
                continue;
            };
            let profile = registry
                .by_name(profile_name)
                .with_context(|| format!("{} uses unknown profile {profile_name:?}", def.name))?;
            let agent = *names
                .get(&def.name)
                .with_context(|| format!("{} was not spawned", def.name))?;
            let mut controller = AiController::new(agent, profile, &registry)?;
            if let Some(master) = &def.assisted {
                controller.set_assisted_entity(names.get(master).copied());
            }
            controllers.insert(agent, controller);
        }

        tracing::debug!(
            entities = names.len(),
            agents = controllers.len(),
            "replay world built"
        );
        Ok(Self {
            random: GameRandom::new(scenario.seed),
            scenario,
            world,
            registry,
            config,
            names,
            controllers,
        })
    }

    pub fn run(&mut self) {
        for tick in 0..self.scenario.ticks {
            self.step(tick);
        }
        tracing::info!(
            ticks = self.scenario.ticks,
            commands = self.world.command_log().len(),
            "replay finished"
        );
    }

    /// Applies the tick's scripted events, lets every agent think once and
    /// advances the clock.
    fn step(&mut self, tick: u32) {
        let events: Vec<ScenarioEventKind> = self
            .scenario
            .events
            .iter()
            .filter(|event| event.tick == tick)
            .map(|event| event.kind.clone())
            .collect();
        for event in events {
            self.apply(event);
        }

        for controller in self.controllers.values_mut() {
            let mut env = AiEnv {
                sim: &mut self.world,
                prototypes: &self.registry,
                random: &mut self.random,
                config: &self.config,
            };
            controller.think(&mut env);
        }
        self.world.advance(self.scenario.tick_ms);
    }

    fn id(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    fn apply(&mut self, event: ScenarioEventKind) {
        tracing::debug!(?event, at = %self.world.now(), "scenario event");
        match event {
            ScenarioEventKind::Damage {
                attacker,
                victim,
                amount,
            } => {
                let (Some(attacker), Some(victim)) = (self.id(&attacker), self.id(&victim)) else {
                    return;
                };
                self.world.record_damage(attacker, victim, amount);
                let remaining = self
                    .world
                    .health(victim)
                    .map_or(0.0, |h: Health| h.current - amount);
                self.world.set_health(victim, remaining);
                if remaining <= 0.0 {
                    self.kill(victim);
                } else if let Some(controller) = self.controllers.get_mut(&victim) {
                    controller.interrupt(Interrupt::Damaged { attacker });
                }
            }
            ScenarioEventKind::Kill(name) => {
                if let Some(entity) = self.id(&name) {
                    self.kill(entity);
                }
            }
            ScenarioEventKind::Teleport { entity, position } => {
                if let Some(entity) = self.id(&entity) {
                    self.world.teleport(entity, position);
                }
            }
            ScenarioEventKind::Alert(name) => {
                if let Some(controller) = self.id(&name).and_then(|id| self.controllers.get_mut(&id)) {
                    controller.interrupt(Interrupt::Alerted);
                }
            }
        }
    }

    fn kill(&mut self, entity: EntityId) {
        self.world.kill(entity, None);
        if let Some(controller) = self.controllers.get_mut(&entity) {
            let mut env = AiEnv {
                sim: &mut self.world,
                prototypes: &self.registry,
                random: &mut self.random,
                config: &self.config,
            };
            controller.on_despawn(&mut env);
        }
    }

    pub fn command_count(&self) -> usize {
        self.world.command_log().len()
    }

    pub fn log_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.world
            .command_log()
            .iter()
            .map(|(at, command)| format!("{at} {command}"))
    }

    /// SHA-256 over the formatted command log, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for line in self.log_lines() {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}
