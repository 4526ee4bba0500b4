//! Unit-test scaffolding: a sandbox world plus per-agent blackboards.

use std::collections::BTreeMap;

use ai_core::sandbox::{SandboxEntity, SandboxWorld};
use ai_core::{AiConfig, EntityId, GameRandom, ProfileOracle, ProfilePrototype, ProfileRef};

use crate::blackboard::Blackboard;
use crate::senses::Senses;
use crate::think::ThinkContext;

#[derive(Default)]
pub(crate) struct Catalog {
    pub profiles: Vec<(ProfileRef, ProfilePrototype)>,
}

impl ProfileOracle for Catalog {
    fn profile(&self, profile: ProfileRef) -> Option<&ProfilePrototype> {
        self.profiles
            .iter()
            .find(|(id, _)| *id == profile)
            .map(|(_, p)| p)
    }
}

pub(crate) struct Harness {
    pub world: SandboxWorld,
    pub random: GameRandom,
    pub config: AiConfig,
    pub catalog: Catalog,
    pub agents: BTreeMap<EntityId, (Blackboard, Senses)>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            world: SandboxWorld::new(),
            random: GameRandom::new(7),
            config: AiConfig::default(),
            catalog: Catalog::default(),
            agents: BTreeMap::new(),
        }
    }

    pub fn spawn(&mut self, entity: SandboxEntity) -> EntityId {
        self.world.spawn(entity)
    }

    pub fn blackboard(&self, agent: EntityId) -> Option<&Blackboard> {
        self.agents.get(&agent).map(|(bb, _)| bb)
    }

    /// Runs `f` with a context for `agent`, keeping its blackboard between
    /// calls.
    pub fn with_ctx<R>(&mut self, agent: EntityId, f: impl FnOnce(&mut ThinkContext<'_>) -> R) -> R {
        let (blackboard, senses) = self.agents.entry(agent).or_default();
        let mut ctx = ThinkContext {
            agent,
            now: self.world.now(),
            sim: &mut self.world,
            prototypes: &self.catalog,
            random: &mut self.random,
            config: &self.config,
            blackboard,
            senses,
        };
        f(&mut ctx)
    }
}
