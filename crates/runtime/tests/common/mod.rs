//! Shared scaffolding for the runtime integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;

use ai_content::{ProfileEntry, ProfileRegistry};
use ai_core::sandbox::{SandboxEntity, SandboxWorld, WorldCommand};
use ai_core::{AiConfig, EntityId, GameRandom, PowerRef, ProfilePrototype, ProfileRef, Timestamp};
use ai_runtime::{AiController, AiEnv, Blackboard};

pub fn entry(id: u32, name: &str, profile: ProfilePrototype) -> ProfileEntry {
    ProfileEntry {
        id: ProfileRef(id),
        name: name.to_string(),
        profile,
    }
}

/// A sandbox world plus one controller per agent, stepped in a fixed order.
pub struct Sim {
    pub world: SandboxWorld,
    pub registry: ProfileRegistry,
    pub random: GameRandom,
    pub config: AiConfig,
    pub controllers: BTreeMap<EntityId, AiController>,
}

impl Sim {
    pub fn new(seed: u64, entries: Vec<ProfileEntry>) -> Self {
        let registry = ProfileRegistry::from_entries(entries).expect("test catalog is valid");
        Self {
            world: SandboxWorld::new(),
            registry,
            random: GameRandom::new(seed),
            config: AiConfig::default(),
            controllers: BTreeMap::new(),
        }
    }

    pub fn spawn(&mut self, entity: SandboxEntity) -> EntityId {
        self.world.spawn(entity)
    }

    pub fn add_agent(&mut self, entity: SandboxEntity, profile: u32) -> EntityId {
        let agent = self.world.spawn(entity);
        let controller = AiController::new(agent, ProfileRef(profile), &self.registry)
            .expect("profile is in the catalog");
        self.controllers.insert(agent, controller);
        agent
    }

    pub fn controller(&self, agent: EntityId) -> &AiController {
        self.controllers.get(&agent).expect("agent has a controller")
    }

    pub fn controller_mut(&mut self, agent: EntityId) -> &mut AiController {
        self.controllers.get_mut(&agent).expect("agent has a controller")
    }

    pub fn blackboard(&self, agent: EntityId) -> &Blackboard {
        self.controller(agent).blackboard()
    }

    pub fn now(&self) -> Timestamp {
        self.world.now()
    }

    /// One think for a single agent, without advancing time.
    pub fn think(&mut self, agent: EntityId) {
        let Some(controller) = self.controllers.get_mut(&agent) else {
            return;
        };
        let mut env = AiEnv {
            sim: &mut self.world,
            prototypes: &self.registry,
            random: &mut self.random,
            config: &self.config,
        };
        controller.think(&mut env);
    }

    /// Every agent thinks once, then the world advances by `ms`.
    pub fn step(&mut self, ms: u64) {
        for controller in self.controllers.values_mut() {
            let mut env = AiEnv {
                sim: &mut self.world,
                prototypes: &self.registry,
                random: &mut self.random,
                config: &self.config,
            };
            controller.think(&mut env);
        }
        self.world.advance(ms);
    }

    pub fn kill(&mut self, entity: EntityId) {
        if let Some(e) = self.world.entity_mut(entity) {
            e.dead = true;
        }
    }

    /// Number of logged commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&WorldCommand) -> bool) -> usize {
        self.world
            .command_log()
            .iter()
            .filter(|(_, command)| pred(command))
            .count()
    }

    /// The entity `agent` was last ordered to follow.
    pub fn last_follow(&self, agent: EntityId) -> Option<EntityId> {
        self.world
            .command_log()
            .iter()
            .rev()
            .find_map(|(_, command)| match command {
                WorldCommand::Follow { entity, target } if *entity == agent => Some(*target),
                _ => None,
            })
    }

    /// Times at which `agent` activated `power`.
    pub fn activations(&self, agent: EntityId, power: PowerRef) -> Vec<Timestamp> {
        self.world
            .command_log()
            .iter()
            .filter_map(|(at, command)| match command {
                WorldCommand::ActivatePower {
                    entity, power: p, ..
                } if *entity == agent && *p == power => Some(*at),
                _ => None,
            })
            .collect()
    }
}
