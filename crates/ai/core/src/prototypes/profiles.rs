//! Behavior profile prototypes.
//!
//! Profiles form a closed set of recurring behavioral shapes. Each variant
//! carries a [`ProfileBase`] (senses, attack cadence, power list) plus the
//! contexts its shape composes. Decision logic lives in the runtime crate.

use crate::types::{PowerRef, ProfileRef};

use super::contexts::{
    AffixSettings, DelayContext, DespawnContext, FlankContext, FleeContext, InteractContext,
    MoveToContext, OrbitContext, RotateContext, TeleportContext, TriggerSpawnersContext,
    UsePowerContext, WanderContext,
};
use super::selection::SelectEntityContext;
use crate::world::CombatTargetFlags;

/// Sensory tunables. `None` falls back to the engine-wide defaults.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SenseConfig {
    pub aggro_range: Option<f32>,
    /// Drop the target once it strays this far from the agent.
    pub leash_range: Option<f32>,
    pub require_line_of_sight: bool,
    pub interval_ms: Option<u64>,
    pub target_flags: CombatTargetFlags,
}

/// Fields shared by every profile.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProfileBase {
    pub senses: SenseConfig,
    /// Installed as a full override while the agent has no target.
    pub no_target_override: Option<ProfileRef>,
    pub attack_rate_min_ms: u64,
    pub attack_rate_max_ms: u64,
    pub powers: Vec<UsePowerContext>,
    pub affix: Option<AffixSettings>,
}

impl ProfileBase {
    pub fn power_context(&self, power: PowerRef) -> Option<&UsePowerContext> {
        self.powers.iter().find(|ctx| ctx.power == Some(power))
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MeleeProfile {
    pub base: ProfileBase,
    pub move_to: MoveToContext,
    pub orbit: Option<OrbitContext>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RangedProfile {
    pub base: ProfileBase,
    /// Approach; usually with `enforce_line_of_sight`.
    pub move_to: MoveToContext,
    /// Kite away when the target closes within `kite_range`.
    pub flee: Option<FleeContext>,
    pub kite_range: f32,
    pub orbit: Option<OrbitContext>,
    pub face_target: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlankerProfile {
    pub base: ProfileBase,
    pub flank: FlankContext,
    pub move_to: MoveToContext,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationaryProfile {
    pub base: ProfileBase,
    /// Turns while a power executes (and while idle with a target).
    pub rotate: Option<RotateContext>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WanderProfile {
    pub base: ProfileBase,
    pub wander: WanderContext,
    /// Pause between wander legs.
    pub delay: Option<DelayContext>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleeProfile {
    pub base: ProfileBase,
    pub flee: FleeContext,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AllyProfile {
    pub base: ProfileBase,
    /// Follow the master; destination is normally `AssistedEntity`.
    pub follow: MoveToContext,
    /// Approach the target in combat.
    pub combat_move: MoveToContext,
    pub orbit: Option<OrbitContext>,
    /// Teleport to the master once farther than `teleport_distance`.
    pub teleport: Option<TeleportContext>,
    pub teleport_distance: f32,
    /// Stop fighting and return once farther than this from the master.
    pub max_distance_from_master: f32,
    /// Despawn when the master is gone; `None` keeps the ally around.
    pub despawn_without_master: Option<DespawnContext>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EnrageTimerProfile {
    pub base: ProfileBase,
    pub move_to: MoveToContext,
    pub orbit: Option<OrbitContext>,
    pub enrage_power: UsePowerContext,
    pub enrage_timer_minutes: f32,
    /// The timer arms once an avatar comes within this radius.
    pub search_radius: f32,
}

/// One health-gated phase of a [`PhaseBossProfile`].
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BossPhase {
    /// Entered once health drops to or below this percentage.
    pub health_threshold_pct: f32,
    /// Played once on entry; the phase starts when it completes.
    pub transition_power: Option<UsePowerContext>,
    /// Replaces the base power list while the phase is active, if non-empty.
    pub powers: Vec<UsePowerContext>,
    pub spawners: Option<TriggerSpawnersContext>,
    pub suppress_movement: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PhaseBossProfile {
    pub base: ProfileBase,
    pub move_to: MoveToContext,
    pub orbit: Option<OrbitContext>,
    /// Ordered by descending threshold.
    pub phases: Vec<BossPhase>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MultishotProfile {
    pub base: ProfileBase,
    pub move_to: MoveToContext,
    pub multishot_power: UsePowerContext,
    pub num_shots: u32,
    /// Pick a fresh hostile before each follow-up shot.
    pub retarget_per_shot: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeaponSwapProfile {
    pub base: ProfileBase,
    pub move_to: MoveToContext,
    pub orbit: Option<OrbitContext>,
    /// Drops the weapon, entering the unarmed state on completion.
    pub drop_weapon: Option<UsePowerContext>,
    pub unarmed_powers: Vec<UsePowerContext>,
    pub unarmed_duration_ms: u64,
    /// Finds the dropped weapon; registered as the interact entity.
    pub weapon_select: SelectEntityContext,
    pub move_to_weapon: MoveToContext,
    pub pickup_weapon: Option<UsePowerContext>,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HideAndShootProfile {
    pub base: ProfileBase,
    pub move_to: MoveToContext,
    pub hide_power: UsePowerContext,
    pub shoot_power: UsePowerContext,
    pub num_shots: u32,
    pub unhide_power: UsePowerContext,
    pub recover: DelayContext,
}

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScavengerProfile {
    pub base: ProfileBase,
    /// Picks the crate; registered as the interact entity.
    pub select: SelectEntityContext,
    pub move_to: MoveToContext,
    pub interact: InteractContext,
    pub despawn: DespawnContext,
}

/// Closed catalog of behavior profiles.
#[derive(Clone, Debug, PartialEq, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProfilePrototype {
    Melee(MeleeProfile),
    Ranged(RangedProfile),
    Flanker(FlankerProfile),
    Stationary(StationaryProfile),
    Wander(WanderProfile),
    Flee(FleeProfile),
    Ally(AllyProfile),
    EnrageTimer(EnrageTimerProfile),
    PhaseBoss(PhaseBossProfile),
    Multishot(MultishotProfile),
    WeaponSwap(WeaponSwapProfile),
    HideAndShoot(HideAndShootProfile),
    Scavenger(ScavengerProfile),
}

impl ProfilePrototype {
    pub fn base(&self) -> &ProfileBase {
        match self {
            ProfilePrototype::Melee(p) => &p.base,
            ProfilePrototype::Ranged(p) => &p.base,
            ProfilePrototype::Flanker(p) => &p.base,
            ProfilePrototype::Stationary(p) => &p.base,
            ProfilePrototype::Wander(p) => &p.base,
            ProfilePrototype::Flee(p) => &p.base,
            ProfilePrototype::Ally(p) => &p.base,
            ProfilePrototype::EnrageTimer(p) => &p.base,
            ProfilePrototype::PhaseBoss(p) => &p.base,
            ProfilePrototype::Multishot(p) => &p.base,
            ProfilePrototype::WeaponSwap(p) => &p.base,
            ProfilePrototype::HideAndShoot(p) => &p.base,
            ProfilePrototype::Scavenger(p) => &p.base,
        }
    }

    /// Every power context the profile may run, for validation and initial
    /// cooldown scheduling.
    pub fn power_contexts(&self) -> Vec<&UsePowerContext> {
        let mut out: Vec<&UsePowerContext> = self.base().powers.iter().collect();
        match self {
            ProfilePrototype::EnrageTimer(p) => out.push(&p.enrage_power),
            ProfilePrototype::PhaseBoss(p) => {
                for phase in &p.phases {
                    out.extend(phase.transition_power.iter());
                    out.extend(phase.powers.iter());
                }
            }
            ProfilePrototype::Multishot(p) => out.push(&p.multishot_power),
            ProfilePrototype::WeaponSwap(p) => {
                out.extend(p.drop_weapon.iter());
                out.extend(p.unarmed_powers.iter());
                out.extend(p.pickup_weapon.iter());
            }
            ProfilePrototype::HideAndShoot(p) => {
                out.push(&p.hide_power);
                out.push(&p.shoot_power);
                out.push(&p.unhide_power);
            }
            _ => {}
        }
        out
    }
}
