//! Procedural state runtime.
//!
//! Holds the agent's active context per substate depth and the override
//! profiles that can take over `think`. The slot stack is tiny and fixed:
//!
//! ```text
//! depth 0   primary behavior      (MoveTo, UsePower, ...)
//! depth 1+  pushed substates      (Rotate while a power runs, ...)
//! ```
//!
//! Ending a slot always ends every slot above it first.

use ai_core::{AiConfig, EntityId, ProfileRef};

use crate::contexts::{ContextHandler, ContextKind, Status};
use crate::errors::{Result, RuntimeError};
use crate::profiles::Profile;
use crate::think::ThinkContext;

const DEPTH: usize = AiConfig::MAX_SUBSTATE_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum OverrideType {
    /// Replaces the agent's own `think` entirely.
    Full,
    /// Runs first; the agent's own `think` is skipped while it holds a state.
    Partial,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProceduralAi {
    slots: [Option<ContextKind>; DEPTH],
    depth: usize,
    last_power_result: Status,
    full_override: Option<ProfileRef>,
    partial_override: Option<ProfileRef>,
    /// The full override was installed by sensing, not by game logic.
    no_target_override: bool,
    running_override: bool,
}

impl ProceduralAi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives `handler` in the current slot.
    ///
    /// A handler of a different kind than the slot's current state is
    /// validated first; on success the old state (and every substate above
    /// it) is ended with `Interrupted` and the new one started. A handler of
    /// the same kind is updated. Finished contexts are ended and their slot
    /// cleared before returning.
    pub fn handle_context(
        &mut self,
        ctx: &mut ThinkContext<'_>,
        handler: &dyn ContextHandler,
    ) -> Status {
        let kind = handler.kind();
        let depth = self.depth;

        let status = if self.slots[depth] == Some(kind) {
            handler.update(ctx)
        } else {
            if !handler.validate(ctx) {
                tracing::trace!(agent = %ctx.agent, %kind, "context rejected");
                return Status::Failed;
            }
            self.end_from(ctx, depth, Status::Interrupted);
            self.slots[depth] = Some(kind);
            tracing::trace!(agent = %ctx.agent, %kind, depth, "context started");
            handler.start(ctx)
        };

        if matches!(status, Status::Completed | Status::Failed) {
            self.end_from(ctx, depth + 1, Status::Interrupted);
            handler.end(ctx, status);
            self.slots[depth] = None;
        }
        status
    }

    /// Moves the current slot to `next`. `None` ends the current state;
    /// `forced` restarts `next` even if it is already the current kind.
    pub fn switch_procedural_state(
        &mut self,
        ctx: &mut ThinkContext<'_>,
        next: Option<&dyn ContextHandler>,
        forced: bool,
    ) -> Status {
        match next {
            None => {
                self.end_from(ctx, self.depth, Status::Interrupted);
                Status::None
            }
            Some(handler) => {
                if forced && self.current_state() == Some(handler.kind()) {
                    self.end_from(ctx, self.depth, Status::Interrupted);
                }
                self.handle_context(ctx, handler)
            }
        }
    }

    /// Ends every slot from `depth` upward with `status`, highest first.
    pub fn end_from(&mut self, ctx: &mut ThinkContext<'_>, depth: usize, status: Status) {
        for slot in (depth..DEPTH).rev() {
            if let Some(kind) = self.slots[slot].take() {
                tracing::trace!(agent = %ctx.agent, %kind, depth = slot, %status, "context ending");
                kind.end(ctx, status);
            }
        }
    }

    pub fn push_substate(&mut self) -> Result<usize> {
        if self.depth + 1 >= DEPTH {
            return Err(RuntimeError::SubstateOverflow { depth: self.depth });
        }
        self.depth += 1;
        Ok(self.depth)
    }

    /// Returns to the parent depth. The popped slot keeps its state so the
    /// next push resumes it.
    pub fn pop_substate(&mut self) -> Result<usize> {
        if self.depth == 0 {
            return Err(RuntimeError::SubstateUnderflow);
        }
        self.depth -= 1;
        Ok(self.depth)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Forces the depth back to zero after unbalanced push/pop and ends
    /// whatever was left running above the primary slot.
    pub fn repair_depth(&mut self, ctx: &mut ThinkContext<'_>) {
        self.depth = 0;
        self.end_from(ctx, 1, Status::Interrupted);
    }

    pub fn state(&self, depth: usize) -> Option<ContextKind> {
        self.slots.get(depth).copied().flatten()
    }

    pub fn current_state(&self) -> Option<ContextKind> {
        self.state(self.depth)
    }

    pub fn last_power_result(&self) -> Status {
        self.last_power_result
    }

    pub fn set_last_power_result(&mut self, status: Status) {
        self.last_power_result = status;
    }

    // ===== overrides =====

    pub fn set_override(&mut self, profile: ProfileRef, override_type: OverrideType) {
        match override_type {
            OverrideType::Full => {
                self.full_override = Some(profile);
                self.no_target_override = false;
            }
            OverrideType::Partial => self.partial_override = Some(profile),
        }
    }

    /// Installs `profile` as a full override that is lifted as soon as a
    /// target is sensed.
    pub fn set_no_target_override(&mut self, agent: EntityId, profile: ProfileRef) {
        tracing::debug!(%agent, %profile, "no target, installing override");
        self.full_override = Some(profile);
        self.no_target_override = true;
    }

    pub fn has_no_target_override(&self) -> bool {
        self.no_target_override && self.full_override.is_some()
    }

    pub fn override_profile(&self, override_type: OverrideType) -> Option<ProfileRef> {
        match override_type {
            OverrideType::Full => self.full_override,
            OverrideType::Partial => self.partial_override,
        }
    }

    pub fn clear_override(&mut self, override_type: OverrideType) {
        match override_type {
            OverrideType::Full => {
                self.full_override = None;
                self.no_target_override = false;
            }
            OverrideType::Partial => self.partial_override = None,
        }
    }

    /// Runs the installed override, if any.
    ///
    /// # Returns
    ///
    /// `true` when the caller must skip its own behavior: always for a full
    /// override, and for a partial override while it holds a state.
    /// Re-entrant calls from inside an override return `false`.
    pub fn handle_override_behavior(&mut self, ctx: &mut ThinkContext<'_>) -> bool {
        if self.running_override {
            return false;
        }
        let prototypes = ctx.prototypes;

        if let Some(profile_ref) = self.full_override {
            let Some(profile) = prototypes.profile(profile_ref) else {
                tracing::warn!(
                    agent = %ctx.agent,
                    error = %RuntimeError::ProfileNotFound(profile_ref),
                    "dropping full override"
                );
                self.clear_override(OverrideType::Full);
                return false;
            };
            self.running_override = true;
            profile.think(self, ctx);
            self.running_override = false;
            return true;
        }

        if let Some(profile_ref) = self.partial_override {
            let Some(profile) = prototypes.profile(profile_ref) else {
                tracing::warn!(
                    agent = %ctx.agent,
                    error = %RuntimeError::ProfileNotFound(profile_ref),
                    "dropping partial override"
                );
                self.clear_override(OverrideType::Partial);
                return false;
            };
            self.running_override = true;
            profile.think(self, ctx);
            self.running_override = false;
            return self.current_state().is_some();
        }

        false
    }

    /// Ends every state and forgets overrides and results.
    pub fn reset(&mut self, ctx: &mut ThinkContext<'_>) {
        self.depth = 0;
        self.end_from(ctx, 0, Status::Interrupted);
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::{Delay, Rotate};
    use crate::testing::Harness;
    use ai_core::prototypes::{DelayContext, RotateContext};
    use ai_core::sandbox::SandboxEntity;
    use ai_core::{PropertyKind, Vector3};

    fn long_delay() -> DelayContext {
        DelayContext {
            min_ms: 5_000,
            max_ms: 5_000,
        }
    }

    #[test]
    fn same_kind_updates_instead_of_restarting() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        let delay = long_delay();
        h.with_ctx(agent, |ctx| {
            assert_eq!(ai.handle_context(ctx, &Delay::new(&delay)), Status::Running);
        });
        h.world.advance(1_000);
        let end_time = h.with_ctx(agent, |ctx| {
            assert_eq!(ai.handle_context(ctx, &Delay::new(&delay)), Status::Running);
            ctx.blackboard.get_time(PropertyKind::AIDelayEndTime)
        });
        assert_eq!(end_time.as_millis(), 5_000);
        assert_eq!(ai.current_state(), Some(ContextKind::Delay));
    }

    #[test]
    fn different_kind_interrupts_current_state() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        let delay = long_delay();
        let rotate = RotateContext::default();
        h.with_ctx(agent, |ctx| {
            ai.handle_context(ctx, &Delay::new(&delay));
            ai.handle_context(ctx, &Rotate::new(&rotate));
            assert!(!ctx.blackboard.has(PropertyKind::AIDelayEndTime));
        });
        assert_eq!(ai.current_state(), Some(ContextKind::Rotate));
    }

    #[test]
    fn finished_context_clears_slot() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        let instant = DelayContext::default();
        let status = h.with_ctx(agent, |ctx| ai.handle_context(ctx, &Delay::new(&instant)));
        assert_eq!(status, Status::Completed);
        assert_eq!(ai.current_state(), None);
    }

    #[test]
    fn ending_a_slot_ends_substates_above() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        let delay = long_delay();
        let rotate = RotateContext::default();
        h.with_ctx(agent, |ctx| {
            ai.handle_context(ctx, &Rotate::new(&rotate));
            assert_eq!(ai.push_substate(), Ok(1));
            ai.handle_context(ctx, &Delay::new(&delay));
            assert_eq!(ai.pop_substate(), Ok(0));
            assert_eq!(ai.state(1), Some(ContextKind::Delay));

            ai.switch_procedural_state(ctx, None, false);
            assert!(!ctx.blackboard.has(PropertyKind::AIDelayEndTime));
        });
        assert_eq!(ai.state(0), None);
        assert_eq!(ai.state(1), None);
    }

    #[test]
    fn substate_stack_is_bounded() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        assert_eq!(ai.pop_substate(), Err(RuntimeError::SubstateUnderflow));
        for expected in 1..DEPTH {
            assert_eq!(ai.push_substate(), Ok(expected));
        }
        assert!(matches!(
            ai.push_substate(),
            Err(RuntimeError::SubstateOverflow { .. })
        ));
        h.with_ctx(agent, |ctx| ai.repair_depth(ctx));
        assert_eq!(ai.depth(), 0);
    }

    #[test]
    fn repairing_depth_ends_orphaned_substates() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        let delay = long_delay();
        let rotate = RotateContext::default();
        h.with_ctx(agent, |ctx| {
            ai.handle_context(ctx, &Rotate::new(&rotate));
            assert_eq!(ai.push_substate(), Ok(1));
            assert_eq!(ai.handle_context(ctx, &Delay::new(&delay)), Status::Running);
            ai.repair_depth(ctx);
            assert!(!ctx.blackboard.has(PropertyKind::AIDelayEndTime));
        });
        assert_eq!(ai.depth(), 0);
        assert_eq!(ai.state(0), Some(ContextKind::Rotate));
        assert_eq!(ai.state(1), None);

        // The next push starts fresh instead of resuming the orphan.
        h.world.advance(1_000);
        let end_time = h.with_ctx(agent, |ctx| {
            ai.push_substate().ok();
            ai.handle_context(ctx, &Delay::new(&delay));
            ai.pop_substate().ok();
            ctx.blackboard.get_time(PropertyKind::AIDelayEndTime)
        });
        assert_eq!(end_time.as_millis(), 6_000);
    }

    #[test]
    fn forced_switch_restarts_same_kind() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        let delay = long_delay();
        h.with_ctx(agent, |ctx| {
            ai.handle_context(ctx, &Delay::new(&delay));
        });
        h.world.advance(1_000);
        let end_time = h.with_ctx(agent, |ctx| {
            ai.switch_procedural_state(ctx, Some(&Delay::new(&delay)), true);
            ctx.blackboard.get_time(PropertyKind::AIDelayEndTime)
        });
        assert_eq!(end_time.as_millis(), 6_000);
    }

    #[test]
    fn no_target_override_flag_follows_full_override() {
        let mut ai = ProceduralAi::new();
        ai.set_no_target_override(EntityId(1), ProfileRef(3));
        assert!(ai.has_no_target_override());
        ai.set_override(ProfileRef(4), OverrideType::Full);
        assert!(!ai.has_no_target_override());
        assert_eq!(ai.override_profile(OverrideType::Full), Some(ProfileRef(4)));
        ai.clear_override(OverrideType::Full);
        assert_eq!(ai.override_profile(OverrideType::Full), None);
    }

    #[test]
    fn missing_override_profile_is_dropped() {
        let mut h = Harness::new();
        let agent = h.spawn(SandboxEntity::at(Vector3::ZERO));
        let mut ai = ProceduralAi::new();
        ai.set_override(ProfileRef(99), OverrideType::Full);
        let handled = h.with_ctx(agent, |ctx| ai.handle_override_behavior(ctx));
        assert!(!handled);
        assert_eq!(ai.override_profile(OverrideType::Full), None);
    }
}
