//! Declarative entity selection.
//!
//! A [`SelectEntityContext`] names a candidate pool, a conjunction of
//! filters and a scoring method. Ties always keep the first candidate in
//! pool order (ascending entity id), so selection is deterministic; the
//! `Random` method draws from the shared random stream.

use ai_core::prototypes::{
    EntityRegistration, SelectEntityContext, SelectFilter, SelectMethod, SelectPool,
};
use ai_core::{EntityId, PropertyKind};

use crate::think::ThinkContext;

/// Picks one entity according to `policy`.
///
/// # Returns
///
/// `None` when the agent is gone or no candidate passes every filter.
pub fn select_entity(ctx: &mut ThinkContext<'_>, policy: &SelectEntityContext) -> Option<EntityId> {
    let origin = ctx.position()?;
    if policy.method == SelectMethod::Agent {
        return Some(ctx.agent);
    }

    let pool: Vec<EntityId> = match policy.pool {
        SelectPool::AllInRegion => match ctx.sim.region(ctx.agent) {
            Some(region) => ctx.sim.entities_in_region(region),
            None => Vec::new(),
        },
        _ => ctx.sim.entities_in_range(origin, policy.range),
    };

    let candidates: Vec<EntityId> = pool
        .into_iter()
        .filter(|&e| in_pool(ctx, policy.pool, e))
        .filter(|&e| within_distance(ctx, policy, e))
        .filter(|&e| policy.filters.iter().all(|f| passes(ctx, f, e)))
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let chosen = match policy.method {
        SelectMethod::FirstFound => candidates.first().copied(),
        SelectMethod::Closest => best_by(&candidates, |e| ctx.distance_sq_to(e).map(|d| -d)),
        SelectMethod::Farthest => best_by(&candidates, |e| ctx.distance_sq_to(e)),
        SelectMethod::HighestProperty(kind) => {
            best_by(&candidates, |e| property(ctx, e, kind))
        }
        SelectMethod::LowestProperty(kind) => {
            best_by(&candidates, |e| property(ctx, e, kind).map(|v| -v))
        }
        SelectMethod::MostDamageInInterval { window_ms } => {
            let since = ai_core::Timestamp(ctx.now.as_millis().saturating_sub(window_ms));
            best_by(&candidates, |e| {
                Some(ctx.sim.damage_dealt(e, ctx.agent, since))
            })
        }
        SelectMethod::Random => {
            let index = ctx.random.range_u64(0, candidates.len() as u64 - 1) as usize;
            candidates.get(index).copied()
        }
        SelectMethod::Agent => Some(ctx.agent),
    };

    tracing::trace!(
        agent = %ctx.agent,
        method = ?policy.method,
        candidates = candidates.len(),
        chosen = ?chosen,
        "entity selected"
    );
    chosen
}

/// Stores a selection in the slot the policy names.
///
/// # Returns
///
/// `false` (and no write) when the slot already holds `entity`.
pub fn register_selected_entity(
    ctx: &mut ThinkContext<'_>,
    registration: EntityRegistration,
    entity: Option<EntityId>,
) -> bool {
    match registration {
        EntityRegistration::Target => {
            if ctx.target() == entity {
                return false;
            }
            ctx.set_target(entity);
        }
        other => {
            let kind = other.property();
            if ctx.blackboard.get_entity(kind) == entity {
                return false;
            }
            ctx.blackboard.set_entity(kind, entity);
        }
    }
    true
}

/// Highest score wins; ties keep the earlier candidate.
fn best_by(candidates: &[EntityId], mut score: impl FnMut(EntityId) -> Option<f32>) -> Option<EntityId> {
    let mut best: Option<(EntityId, f32)> = None;
    for &candidate in candidates {
        let Some(value) = score(candidate) else {
            continue;
        };
        if best.is_none_or(|(_, best_value)| value > best_value) {
            best = Some((candidate, value));
        }
    }
    best.map(|(entity, _)| entity)
}

fn property(ctx: &ThinkContext<'_>, entity: EntityId, kind: PropertyKind) -> Option<f32> {
    ctx.sim.properties(entity).map(|props| props.get_float(kind))
}

fn in_pool(ctx: &ThinkContext<'_>, pool: SelectPool, entity: EntityId) -> bool {
    match pool {
        SelectPool::Allies => !ctx.sim.is_hostile(ctx.agent, entity),
        SelectPool::Enemies => ctx.sim.is_hostile(ctx.agent, entity),
        SelectPool::AllInRange | SelectPool::AllInRegion => true,
    }
}

fn within_distance(ctx: &ThinkContext<'_>, policy: &SelectEntityContext, entity: EntityId) -> bool {
    let Some(dist_sq) = ctx.distance_sq_to(entity) else {
        return false;
    };
    if let Some(min) = policy.min_distance
        && dist_sq < min * min
    {
        return false;
    }
    if let Some(max) = policy.max_distance
        && dist_sq > max * max
    {
        return false;
    }
    true
}

fn passes(ctx: &ThinkContext<'_>, filter: &SelectFilter, entity: EntityId) -> bool {
    let sim = &*ctx.sim;
    match *filter {
        SelectFilter::HasKeyword(keyword) => sim.has_keyword(entity, keyword),
        SelectFilter::Alive => sim.is_alive(entity),
        SelectFilter::Dead => sim.is_dead(entity),
        SelectFilter::DistanceBand { min, max } => ctx
            .distance_sq_to(entity)
            .is_some_and(|d| d >= min * min && d <= max * max),
        SelectFilter::PrototypeIs(proto) => sim.prototype(entity) == Some(proto),
        SelectFilter::PrototypeIsNot(proto) => sim.prototype(entity) != Some(proto),
        SelectFilter::PropertyAtLeast { kind, value } => sim
            .properties(entity)
            .is_some_and(|p| p.get_int(kind) >= value),
        SelectFilter::PropertyAtMost { kind, value } => sim
            .properties(entity)
            .is_some_and(|p| p.get_int(kind) <= value),
        SelectFilter::Hostile => sim.is_hostile(ctx.agent, entity),
        SelectFilter::NotHostile => !sim.is_hostile(ctx.agent, entity),
        SelectFilter::IsMelee => sim.is_melee(entity),
        SelectFilter::IsRanged => !sim.is_melee(entity),
        SelectFilter::IsAvatar => sim.is_avatar(entity),
        SelectFilter::NotAvatar => !sim.is_avatar(entity),
        SelectFilter::HealthBelowPct(pct) => sim.health(entity).is_some_and(|h| h.percent() < pct),
        SelectFilter::HasLineOfSight => sim
            .position(entity)
            .is_some_and(|pos| sim.line_of_sight(ctx.agent, pos)),
        SelectFilter::NotSelf => entity != ctx.agent,
    }
}
