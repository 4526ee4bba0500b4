//! Weighted power selection and resumption of in-progress power uses.

use arrayvec::ArrayVec;

use ai_core::prototypes::UsePowerContext;
use ai_core::{AiConfig, GameRandom, PowerRef, PropertyKind};

use crate::contexts::{ContextHandler, ContextKind, Status, UseAffixPower, UsePower};
use crate::errors::RuntimeError;
use crate::procedural::ProceduralAi;
use crate::profiles::Profile;
use crate::think::ThinkContext;

/// One candidate. `power: None` stands for "one of the agent's affix
/// powers".
#[derive(Debug, Clone, Copy)]
pub struct PickerEntry<'p> {
    pub power: Option<&'p UsePowerContext>,
    pub weight: u32,
}

/// Candidate list for one pick, bounded by [`AiConfig::MAX_PICKER_ENTRIES`].
#[derive(Debug, Default)]
pub struct PowerPicker<'p> {
    entries: ArrayVec<PickerEntry<'p>, { AiConfig::MAX_PICKER_ENTRIES }>,
}

impl<'p> PowerPicker<'p> {
    pub fn new() -> Self {
        Self {
            entries: ArrayVec::new(),
        }
    }

    /// Adds a power context with its configured weight. Returns `false` when
    /// the picker is full.
    pub fn add(&mut self, power: &'p UsePowerContext) -> bool {
        self.push(PickerEntry {
            power: Some(power),
            weight: power.pick_weight,
        })
    }

    pub fn add_affix(&mut self, weight: u32) -> bool {
        self.push(PickerEntry {
            power: None,
            weight,
        })
    }

    fn push(&mut self, entry: PickerEntry<'p>) -> bool {
        if self.entries.try_push(entry).is_err() {
            tracing::warn!(
                capacity = AiConfig::MAX_PICKER_ENTRIES,
                "power picker full, dropping entry"
            );
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws one entry by weight and removes it; remaining entries keep
    /// their order.
    pub fn pick(&mut self, random: &mut GameRandom) -> Option<PickerEntry<'p>> {
        let weights: ArrayVec<u32, { AiConfig::MAX_PICKER_ENTRIES }> =
            self.entries.iter().map(|e| e.weight).collect();
        let index = random.pick_weighted(&weights)?;
        Some(self.entries.remove(index))
    }
}

fn difficulty_restricted(ctx: &ThinkContext<'_>, power: &UsePowerContext) -> bool {
    power
        .difficulty
        .is_some_and(|range| !range.contains(ctx.sim.difficulty_tier()))
}

/// Records the outcome of a power use and schedules the next attack after a
/// completed one.
fn finish<P: Profile + ?Sized>(
    profile: &P,
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    status: Status,
) -> Status {
    if status == Status::None {
        return status;
    }
    ai.set_last_power_result(status);
    if status.is_completed() {
        let base = profile.base();
        let delay = ctx.random_ms(base.attack_rate_min_ms, base.attack_rate_max_ms);
        let next = ctx.now.plus_millis(delay);
        ctx.blackboard.set_time(PropertyKind::AINextAttackTime, next);
    }
    status
}

fn desync(ai: &mut ProceduralAi, ctx: &mut ThinkContext<'_>, power: Option<PowerRef>) -> Status {
    tracing::warn!(
        agent = %ctx.agent,
        error = %RuntimeError::PowerDesync { agent: ctx.agent, power },
        "ending power state"
    );
    ai.switch_procedural_state(ctx, None, false);
    ai.set_last_power_result(Status::Failed);
    Status::Failed
}

fn resume_power<P: Profile + ?Sized>(
    profile: &P,
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
) -> Status {
    let candidates = [
        ctx.sim.executing_power(ctx.agent),
        ctx.blackboard.power_ref(PropertyKind::AISyncAttackPower),
        ctx.blackboard.power_ref(PropertyKind::AIActivePower),
    ];
    let Some(proto) = candidates
        .iter()
        .flatten()
        .find_map(|&power| profile.power_context(power))
    else {
        return desync(ai, ctx, candidates.into_iter().flatten().next());
    };

    let status = profile.handle_power_entry(ai, ctx, proto);
    if matches!(status, Status::Completed | Status::Failed) {
        profile.on_power_ended(ai, ctx, proto, status);
    }
    finish(profile, ai, ctx, status)
}

fn resume_affix<P: Profile + ?Sized>(
    profile: &P,
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
) -> Status {
    let Some(affix) = &profile.base().affix else {
        let power = ctx.blackboard.power_ref(PropertyKind::AIActiveAffixPower);
        return desync(ai, ctx, power);
    };
    let status = ai.handle_context(ctx, &UseAffixPower::new(affix));
    finish(profile, ai, ctx, status)
}

/// The power step of a profile's `think`.
///
/// Resumes an in-progress power use if there is one. Otherwise, once
/// `AINextAttackTime` has passed, draws weighted candidates without
/// replacement until one starts or the list runs out.
///
/// # Returns
///
/// `Status::None` when nothing was attempted, otherwise the (profile
/// adjusted) status of the last attempt.
pub fn handle_procedural_power<P: Profile + ?Sized>(
    profile: &P,
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
) -> Status {
    match ai.current_state() {
        Some(ContextKind::UsePower) => return resume_power(profile, ai, ctx),
        Some(ContextKind::UseAffixPower) => return resume_affix(profile, ai, ctx),
        _ => {}
    }
    if ctx.now < ctx.blackboard.get_time(PropertyKind::AINextAttackTime) {
        return Status::None;
    }

    let mut picker = PowerPicker::new();
    profile.populate_power_picker(ctx, &mut picker);
    let affix = profile.base().affix.as_ref();
    if let Some(affix) = affix
        && affix.pick_weight > 0
        && !ctx.sim.affix_powers(ctx.agent).is_empty()
    {
        picker.add_affix(affix.pick_weight);
    }

    let mut status = Status::None;
    while let Some(entry) = picker.pick(ctx.random) {
        match entry.power {
            Some(proto) => {
                if difficulty_restricted(ctx, proto) {
                    continue;
                }
                profile.on_power_picked(ai, ctx, proto);
                status = profile.handle_power_entry(ai, ctx, proto);
                if status.consumes_tick() {
                    tracing::debug!(agent = %ctx.agent, power = ?proto.power, %status, "power picked");
                    profile.on_power_started(ai, ctx, proto, status);
                    if status.is_completed() {
                        profile.on_power_ended(ai, ctx, proto, status);
                    }
                    break;
                }
            }
            None => {
                let Some(affix) = affix else {
                    continue;
                };
                status = ai.handle_context(ctx, &UseAffixPower::new(affix));
                if status.consumes_tick() {
                    tracing::debug!(agent = %ctx.agent, %status, "affix power picked");
                    break;
                }
            }
        }
    }
    finish(profile, ai, ctx, status)
}

/// Uses `proto` immediately, bypassing the attack-rate gate and the
/// weighted pick. Hooks run as for a picked power.
///
/// A power that cannot start now fails without touching the current
/// state, so a running power is only interrupted for one that validates.
pub fn use_power_direct<P: Profile + ?Sized>(
    profile: &P,
    ai: &mut ProceduralAi,
    ctx: &mut ThinkContext<'_>,
    proto: &UsePowerContext,
) -> Status {
    let in_power_state = ai.current_state() == Some(ContextKind::UsePower);
    let resuming =
        in_power_state && ctx.blackboard.power_ref(PropertyKind::AIActivePower) == proto.power;
    if !resuming {
        if !UsePower::new(proto).validate(ctx) {
            tracing::trace!(agent = %ctx.agent, power = ?proto.power, "direct power unavailable");
            return Status::Failed;
        }
        if in_power_state {
            ai.switch_procedural_state(ctx, None, false);
        }
    }

    if !resuming {
        profile.on_power_picked(ai, ctx, proto);
    }
    let status = profile.handle_power_entry(ai, ctx, proto);
    if !resuming && status.consumes_tick() {
        profile.on_power_started(ai, ctx, proto, status);
    }
    if status.is_completed() || (resuming && status.is_failed()) {
        profile.on_power_ended(ai, ctx, proto, status);
    }
    finish(profile, ai, ctx, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_exhausts_without_repeats() {
        let powers: Vec<UsePowerContext> = (1..=5)
            .map(|i| UsePowerContext {
                pick_weight: i,
                ..UsePowerContext::with_power(PowerRef(i))
            })
            .collect();
        let mut picker = PowerPicker::new();
        for p in &powers {
            assert!(picker.add(p));
        }
        let mut random = GameRandom::new(11);
        let mut seen = Vec::new();
        while let Some(entry) = picker.pick(&mut random) {
            seen.push(entry.power.and_then(|p| p.power));
        }
        seen.sort();
        assert_eq!(seen, (1..=5).map(|i| Some(PowerRef(i))).collect::<Vec<_>>());
        assert!(picker.is_empty());
    }

    #[test]
    fn capacity_is_enforced() {
        let power = UsePowerContext::with_power(PowerRef(1));
        let mut picker = PowerPicker::new();
        for _ in 0..AiConfig::MAX_PICKER_ENTRIES {
            assert!(picker.add(&power));
        }
        assert!(!picker.add_affix(1));
        assert_eq!(picker.len(), AiConfig::MAX_PICKER_ENTRIES);
    }
}
