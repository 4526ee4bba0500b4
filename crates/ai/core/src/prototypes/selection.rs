//! Declarative entity selection policies.

use crate::properties::PropertyKind;
use crate::types::{KeywordId, PrototypeId};

/// Candidate pool a selection starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectPool {
    Allies,
    #[default]
    Enemies,
    AllInRange,
    /// Everything in the agent's region, ignoring `range`.
    AllInRegion,
}

/// Candidate filter. All filters of a policy must pass.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectFilter {
    HasKeyword(KeywordId),
    Alive,
    Dead,
    DistanceBand { min: f32, max: f32 },
    PrototypeIs(PrototypeId),
    PrototypeIsNot(PrototypeId),
    PropertyAtLeast { kind: PropertyKind, value: i64 },
    PropertyAtMost { kind: PropertyKind, value: i64 },
    Hostile,
    NotHostile,
    IsMelee,
    IsRanged,
    IsAvatar,
    NotAvatar,
    /// Health strictly below this percentage.
    HealthBelowPct(f32),
    HasLineOfSight,
    NotSelf,
}

/// How the winner is chosen among candidates that passed every filter.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectMethod {
    #[default]
    Closest,
    Farthest,
    FirstFound,
    HighestProperty(PropertyKind),
    LowestProperty(PropertyKind),
    /// Most damage dealt to the agent within the trailing window.
    MostDamageInInterval { window_ms: u64 },
    Random,
    /// The agent itself.
    Agent,
}

/// Blackboard slot a selection is registered into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityRegistration {
    #[default]
    Target,
    AssistedEntity,
    InteractEntity,
    CustomEntity,
}

impl EntityRegistration {
    pub const fn property(self) -> PropertyKind {
        match self {
            EntityRegistration::Target => PropertyKind::AITargetId,
            EntityRegistration::AssistedEntity => PropertyKind::AIAssistedEntityId,
            EntityRegistration::InteractEntity => PropertyKind::AIInteractEntityId,
            EntityRegistration::CustomEntity => PropertyKind::AICustomEntityVal1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectEntityContext {
    pub pool: SelectPool,
    /// Search radius for range-based pools.
    pub range: f32,
    pub filters: Vec<SelectFilter>,
    pub method: SelectMethod,
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub register: EntityRegistration,
}

impl Default for SelectEntityContext {
    fn default() -> Self {
        Self {
            pool: SelectPool::Enemies,
            range: 600.0,
            filters: Vec::new(),
            method: SelectMethod::Closest,
            min_distance: None,
            max_distance: None,
            register: EntityRegistration::Target,
        }
    }
}
