//! Tunables for each context handler.
//!
//! These records are immutable configuration shared by every agent using a
//! profile. Per-agent progress (deadlines, counters, waypoints) lives in the
//! agent's blackboard, never here.

use crate::properties::PropertyKind;
use crate::types::{DifficultyRange, PowerRef, PrototypeId, Vector3};
use crate::world::SpawnerAction;

use super::selection::SelectEntityContext;

/// Where a [`MoveToContext`] heads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveToDestination {
    #[default]
    Target,
    AssistedEntity,
    InteractEntity,
    SpawnPosition,
    DespawnPosition,
    /// Walks the context's `path` one node at a time.
    PathNode,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoveToContext {
    pub destination: MoveToDestination,
    /// Arrival distance, measured between bounds.
    pub range: f32,
    /// Keep moving until the destination is also in line of sight.
    pub enforce_line_of_sight: bool,
    /// Consecutive LOS misses tolerated before failing. `None` uses the
    /// engine default.
    pub los_failure_budget: Option<u32>,
    /// A path failure only drops the target when the last power use failed.
    pub check_power: bool,
    /// Stop locomotion on arrival.
    pub stop_on_arrival: bool,
    pub path: Vec<Vector3>,
}

impl Default for MoveToContext {
    fn default() -> Self {
        Self {
            destination: MoveToDestination::Target,
            range: 0.0,
            enforce_line_of_sight: false,
            los_failure_budget: None,
            check_power: false,
            stop_on_arrival: true,
            path: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrbitContext {
    /// Arc walked per step, in degrees.
    pub angle_degrees: f32,
    /// Orbit radius; zero keeps the current distance to the target.
    pub radius: f32,
    pub randomize_direction: bool,
}

impl Default for OrbitContext {
    fn default() -> Self {
        Self {
            angle_degrees: 45.0,
            radius: 0.0,
            randomize_direction: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlankContext {
    /// Angle from the target's facing (180 = directly behind).
    pub angle_degrees: f32,
    pub radius: f32,
    /// Mirror the flank angle to a random side each time.
    pub randomize_angle: bool,
    pub arrival_range: f32,
    /// Minimum time between flank attempts.
    pub interval_min_ms: u64,
    pub interval_max_ms: u64,
    pub timeout_ms: u64,
    /// On timeout: `true` reports Failed, `false` Completed.
    pub fail_on_timeout: bool,
}

impl Default for FlankContext {
    fn default() -> Self {
        Self {
            angle_degrees: 180.0,
            radius: 100.0,
            randomize_angle: true,
            arrival_range: 10.0,
            interval_min_ms: 3_000,
            interval_max_ms: 6_000,
            timeout_ms: 4_000,
            fail_on_timeout: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleeContext {
    pub duration_min_ms: u64,
    pub duration_max_ms: u64,
    pub distance_min: f32,
    pub distance_max: f32,
    /// Random deviation from straight away, in degrees either side.
    pub angle_variance_degrees: f32,
    /// Bias the flee direction toward the nearest ally within this range.
    pub ally_bias_range: Option<f32>,
}

impl Default for FleeContext {
    fn default() -> Self {
        Self {
            duration_min_ms: 2_000,
            duration_max_ms: 4_000,
            distance_min: 200.0,
            distance_max: 400.0,
            angle_variance_degrees: 30.0,
            ally_bias_range: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WanderBase {
    #[default]
    Current,
    SpawnPoint,
    Target,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WanderContext {
    pub base: WanderBase,
    pub radius_min: f32,
    pub radius_max: f32,
    pub arrival_range: f32,
}

impl Default for WanderContext {
    fn default() -> Self {
        Self {
            base: WanderBase::Current,
            radius_min: 50.0,
            radius_max: 200.0,
            arrival_range: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotateDirection {
    #[default]
    Clockwise,
    CounterClockwise,
    Random,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RotateContext {
    pub direction: RotateDirection,
    pub degrees: f32,
    /// Keep facing the current target instead of a fixed turn. Never
    /// completes on its own.
    pub track_target: bool,
}

impl Default for RotateContext {
    fn default() -> Self {
        Self {
            direction: RotateDirection::Clockwise,
            degrees: 90.0,
            track_target: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DelayContext {
    pub min_ms: u64,
    pub max_ms: u64,
}

/// Swaps the agent's target for the duration of one power use.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TargetSwitchContext {
    pub select: SelectEntityContext,
    /// Keep the switched target after the power ends.
    pub permanent: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UsePowerContext {
    /// `None` is a configuration bug and always fails validation.
    pub power: Option<PowerRef>,
    pub pick_weight: u32,
    pub cooldown_min_ms: u64,
    pub cooldown_max_ms: u64,
    /// Cooldown scheduled on the agent's first think.
    pub initial_cooldown_min_ms: u64,
    pub initial_cooldown_max_ms: u64,
    pub difficulty: Option<DifficultyRange>,
    pub requires_target: bool,
    pub require_line_of_sight: bool,
    pub target_switch: Option<TargetSwitchContext>,
    /// Record the power in `AISyncAttackPower` so the use can be resumed
    /// even when the power system stops reporting it as executing.
    pub sync_attack: bool,
}

impl Default for UsePowerContext {
    fn default() -> Self {
        Self {
            power: None,
            pick_weight: 1,
            cooldown_min_ms: 0,
            cooldown_max_ms: 0,
            initial_cooldown_min_ms: 0,
            initial_cooldown_max_ms: 0,
            difficulty: None,
            requires_target: true,
            require_line_of_sight: false,
            target_switch: None,
            sync_attack: false,
        }
    }
}

impl UsePowerContext {
    pub fn with_power(power: PowerRef) -> Self {
        Self {
            power: Some(power),
            ..Self::default()
        }
    }
}

/// Affix powers take part in the picker as one weighted entry.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AffixSettings {
    pub pick_weight: u32,
    /// Shared tunables for every affix power; `power` is ignored.
    pub context: UsePowerContext,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DespawnTarget {
    #[default]
    Agent,
    Target,
    InteractEntity,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DespawnContext {
    pub target: DespawnTarget,
    /// Kill instead of silently removing.
    pub kill: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TeleportDestination {
    #[default]
    AssistedEntity,
    SpawnPosition,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TeleportContext {
    pub destination: TeleportDestination,
    /// Distance kept from the destination entity.
    pub offset: f32,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TriggerSpawnersContext {
    pub spawners: Vec<PrototypeId>,
    pub radius: f32,
    pub action: SpawnerAction,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InteractContext {
    /// Blackboard entity slot naming what to interact with.
    pub entity: PropertyKind,
    pub range: f32,
}

impl Default for InteractContext {
    fn default() -> Self {
        Self {
            entity: PropertyKind::AIInteractEntityId,
            range: 50.0,
        }
    }
}
