//! Per-agent controller.
//!
//! [`AiController`] owns everything that belongs to one agent (blackboard,
//! senses, procedural state, pending interrupts) and runs the agent's
//! profile once per `think`. The host supplies the world and shared services
//! through [`AiEnv`] on every call.

use arrayvec::ArrayVec;

use ai_core::{
    AiConfig, EntityId, GameRandom, ProfileOracle, ProfileRef, PropertyKind, Simulation,
};

use crate::blackboard::Blackboard;
use crate::errors::{Result, RuntimeError};
use crate::procedural::{OverrideType, ProceduralAi};
use crate::profiles::Profile;
use crate::senses::Senses;
use crate::think::ThinkContext;

/// Events the host raises between thinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Something noticed the agent; sense on the next think.
    Alerted,
    /// The agent was hit. Adopts the attacker when no target is held.
    Damaged { attacker: EntityId },
    /// The game-installed full override ran its course.
    OverrideExpired,
}

/// Shared services for one `think` call.
pub struct AiEnv<'a> {
    pub sim: &'a mut dyn Simulation,
    pub prototypes: &'a dyn ProfileOracle,
    pub random: &'a mut GameRandom,
    pub config: &'a AiConfig,
}

#[derive(Debug, Clone)]
pub struct AiController {
    agent: EntityId,
    profile: ProfileRef,
    blackboard: Blackboard,
    senses: Senses,
    procedural: ProceduralAi,
    interrupts: ArrayVec<Interrupt, { AiConfig::INTERRUPT_QUEUE_CAPACITY }>,
}

impl AiController {
    /// Creates a controller for `agent` driven by `profile`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::ProfileNotFound`] when the catalog has no such
    /// profile.
    pub fn new(
        agent: EntityId,
        profile: ProfileRef,
        prototypes: &dyn ProfileOracle,
    ) -> Result<Self> {
        if prototypes.profile(profile).is_none() {
            return Err(RuntimeError::ProfileNotFound(profile));
        }
        Ok(Self {
            agent,
            profile,
            blackboard: Blackboard::new(),
            senses: Senses::new(),
            procedural: ProceduralAi::new(),
            interrupts: ArrayVec::new(),
        })
    }

    pub fn agent(&self) -> EntityId {
        self.agent
    }

    pub fn profile(&self) -> ProfileRef {
        self.profile
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn procedural(&self) -> &ProceduralAi {
        &self.procedural
    }

    pub fn target(&self) -> Option<EntityId> {
        self.senses.current_target
    }

    /// Queues an interrupt for the next think. Returns `false` (and drops
    /// it) when the queue is full.
    pub fn interrupt(&mut self, interrupt: Interrupt) -> bool {
        if self.interrupts.try_push(interrupt).is_err() {
            tracing::debug!(agent = %self.agent, ?interrupt, "interrupt queue full, dropping");
            return false;
        }
        true
    }

    /// Master an ally profile follows.
    pub fn set_assisted_entity(&mut self, entity: Option<EntityId>) {
        self.blackboard
            .set_entity(PropertyKind::AIAssistedEntityId, entity);
    }

    pub fn set_override(&mut self, profile: ProfileRef, override_type: OverrideType) {
        tracing::debug!(agent = %self.agent, %profile, %override_type, "override installed");
        self.procedural.set_override(profile, override_type);
    }

    pub fn clear_override(&mut self, override_type: OverrideType) {
        tracing::debug!(agent = %self.agent, %override_type, "override cleared");
        self.procedural.clear_override(override_type);
    }

    /// Runs one decision for the agent.
    pub fn think(&mut self, env: &mut AiEnv<'_>) {
        let prototypes = env.prototypes;
        let Some(profile) = prototypes.profile(self.profile) else {
            tracing::warn!(
                agent = %self.agent,
                error = %RuntimeError::ProfileNotFound(self.profile),
                "skipping think"
            );
            return;
        };

        let mut ctx = ThinkContext {
            agent: self.agent,
            now: env.sim.game_time(),
            sim: &mut *env.sim,
            prototypes,
            random: &mut *env.random,
            config: env.config,
            blackboard: &mut self.blackboard,
            senses: &mut self.senses,
        };
        if !ctx.sim.is_in_world(self.agent) {
            tracing::trace!(
                agent = %self.agent,
                error = %RuntimeError::AgentNotInWorld(self.agent),
                "skipping think"
            );
            return;
        }

        if !ctx.blackboard.get_bool(PropertyKind::AIProfileInitialized) {
            ctx.blackboard.spawn_point = ctx.position();
            profile.init(&mut self.procedural, &mut ctx);
            ctx.blackboard
                .set_bool(PropertyKind::AIProfileInitialized, true);
            let name: &str = profile.as_ref();
            tracing::debug!(agent = %self.agent, profile = name, "profile initialized");
        }

        for interrupt in self.interrupts.drain(..) {
            apply_interrupt(&mut self.procedural, &mut ctx, interrupt);
        }

        profile.think(&mut self.procedural, &mut ctx);

        let depth = self.procedural.depth();
        if depth != 0 {
            tracing::error!(
                agent = %self.agent,
                error = %RuntimeError::UnbalancedSubstates { agent: self.agent, depth },
                "repairing substate depth"
            );
            self.procedural.repair_depth(&mut ctx);
        }
    }

    /// Ends running contexts and forgets all per-agent state.
    pub fn on_despawn(&mut self, env: &mut AiEnv<'_>) {
        let mut ctx = ThinkContext {
            agent: self.agent,
            now: env.sim.game_time(),
            sim: &mut *env.sim,
            prototypes: env.prototypes,
            random: &mut *env.random,
            config: env.config,
            blackboard: &mut self.blackboard,
            senses: &mut self.senses,
        };
        self.procedural.reset(&mut ctx);
        self.blackboard.reset();
        self.senses.reset();
        self.interrupts.clear();
        tracing::debug!(agent = %self.agent, "controller reset on despawn");
    }
}

fn apply_interrupt(ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>, interrupt: Interrupt) {
    tracing::trace!(agent = %ctx.agent, ?interrupt, "interrupt");
    match interrupt {
        Interrupt::Alerted => {
            ctx.senses.wake();
            if ai.has_no_target_override() && ctx.live_target().is_some() {
                ai.clear_override(OverrideType::Full);
            }
        }
        Interrupt::Damaged { attacker } => {
            if ctx.live_target().is_none()
                && ctx.sim.is_alive(attacker)
                && ctx.sim.is_hostile(ctx.agent, attacker)
            {
                ctx.set_target(Some(attacker));
                if ai.has_no_target_override() {
                    ai.clear_override(OverrideType::Full);
                }
            }
        }
        Interrupt::OverrideExpired => {
            if !ai.has_no_target_override() {
                ai.clear_override(OverrideType::Full);
            }
        }
    }
}
