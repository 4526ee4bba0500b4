//! Immutable configuration records: context tunables, selection policies
//! and behavior profiles.
//!
//! Prototypes are validated once at load time with
//! [`ProfilePrototype::validate`]; the runtime still degrades gracefully
//! (warning + `Failed`) when handed unvalidated data.

mod contexts;
mod profiles;
mod selection;

pub use contexts::{
    AffixSettings, DelayContext, DespawnContext, DespawnTarget, FlankContext, FleeContext,
    InteractContext, MoveToContext, MoveToDestination, OrbitContext, RotateContext,
    RotateDirection, TargetSwitchContext, TeleportContext, TeleportDestination,
    TriggerSpawnersContext, UsePowerContext, WanderBase, WanderContext,
};
pub use profiles::{
    AllyProfile, BossPhase, EnrageTimerProfile, FlankerProfile, FleeProfile, HideAndShootProfile,
    MeleeProfile, MultishotProfile, PhaseBossProfile, ProfileBase, ProfilePrototype,
    RangedProfile, ScavengerProfile, SenseConfig, StationaryProfile, WanderProfile,
    WeaponSwapProfile,
};
pub use selection::{
    EntityRegistration, SelectEntityContext, SelectFilter, SelectMethod, SelectPool,
};

use crate::error::{AiError, ErrorSeverity};

/// Malformed prototype data.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{context}: power context has no power")]
    MissingPower { context: &'static str },

    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field}: negative value {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("{field} must be at least 1")]
    ZeroCount { field: &'static str },

    #[error("phase {index} threshold {threshold}% is not below the previous phase")]
    PhaseOrder { index: usize, threshold: f32 },
}

impl AiError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingPower { .. } => "missing_power",
            Self::InvertedRange { .. } => "inverted_range",
            Self::NegativeValue { .. } => "negative_value",
            Self::ZeroCount { .. } => "zero_count",
            Self::PhaseOrder { .. } => "phase_order",
        }
    }
}

fn check_range<T: PartialOrd + Into<f64> + Copy>(
    field: &'static str,
    min: T,
    max: T,
) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange {
            field,
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}

fn check_ms_range(field: &'static str, min: u64, max: u64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange {
            field,
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::NegativeValue {
            field,
            value: value.into(),
        });
    }
    Ok(())
}

impl UsePowerContext {
    pub fn validate(&self, context: &'static str) -> Result<(), ConfigError> {
        if self.power.is_none() {
            return Err(ConfigError::MissingPower { context });
        }
        self.validate_timing()
    }

    /// Timing checks only, for templates whose power is supplied later
    /// (affix powers).
    pub fn validate_timing(&self) -> Result<(), ConfigError> {
        check_ms_range("cooldown", self.cooldown_min_ms, self.cooldown_max_ms)?;
        check_ms_range(
            "initial_cooldown",
            self.initial_cooldown_min_ms,
            self.initial_cooldown_max_ms,
        )?;
        if let Some(range) = self.difficulty {
            check_range("difficulty", range.min.0, range.max.0)?;
        }
        Ok(())
    }
}

impl MoveToContext {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("move_to.range", self.range)
    }
}

impl FlankContext {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("flank.radius", self.radius)?;
        check_ms_range("flank.interval", self.interval_min_ms, self.interval_max_ms)
    }
}

impl FleeContext {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ms_range("flee.duration", self.duration_min_ms, self.duration_max_ms)?;
        check_range("flee.distance", self.distance_min, self.distance_max)
    }
}

impl WanderContext {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("wander.radius_min", self.radius_min)?;
        check_range("wander.radius", self.radius_min, self.radius_max)
    }
}

impl DelayContext {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ms_range("delay", self.min_ms, self.max_ms)
    }
}

impl ProfileBase {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ms_range(
            "attack_rate",
            self.attack_rate_min_ms,
            self.attack_rate_max_ms,
        )?;
        for power in &self.powers {
            power.validate("powers")?;
        }
        if let Some(affix) = &self.affix {
            affix.context.validate_timing()?;
        }
        Ok(())
    }
}

impl ProfilePrototype {
    /// Checks the whole profile, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base().validate()?;
        match self {
            ProfilePrototype::Melee(p) => p.move_to.validate(),
            ProfilePrototype::Ranged(p) => {
                p.move_to.validate()?;
                check_non_negative("kite_range", p.kite_range)?;
                p.flee.as_ref().map_or(Ok(()), FleeContext::validate)
            }
            ProfilePrototype::Flanker(p) => {
                p.flank.validate()?;
                p.move_to.validate()
            }
            ProfilePrototype::Stationary(_) => Ok(()),
            ProfilePrototype::Wander(p) => {
                p.wander.validate()?;
                p.delay.as_ref().map_or(Ok(()), DelayContext::validate)
            }
            ProfilePrototype::Flee(p) => p.flee.validate(),
            ProfilePrototype::Ally(p) => {
                p.follow.validate()?;
                p.combat_move.validate()
            }
            ProfilePrototype::EnrageTimer(p) => {
                p.move_to.validate()?;
                p.enrage_power.validate("enrage_power")?;
                check_non_negative("enrage_timer_minutes", p.enrage_timer_minutes)?;
                check_non_negative("search_radius", p.search_radius)
            }
            ProfilePrototype::PhaseBoss(p) => {
                p.move_to.validate()?;
                let mut previous = 100.0_f32;
                for (index, phase) in p.phases.iter().enumerate() {
                    if phase.health_threshold_pct > previous {
                        return Err(ConfigError::PhaseOrder {
                            index,
                            threshold: phase.health_threshold_pct,
                        });
                    }
                    previous = phase.health_threshold_pct;
                    if let Some(power) = &phase.transition_power {
                        power.validate("phase.transition_power")?;
                    }
                    for power in &phase.powers {
                        power.validate("phase.powers")?;
                    }
                }
                Ok(())
            }
            ProfilePrototype::Multishot(p) => {
                p.move_to.validate()?;
                p.multishot_power.validate("multishot_power")?;
                if p.num_shots == 0 {
                    return Err(ConfigError::ZeroCount { field: "num_shots" });
                }
                Ok(())
            }
            ProfilePrototype::WeaponSwap(p) => {
                p.move_to.validate()?;
                p.move_to_weapon.validate()?;
                if let Some(power) = &p.drop_weapon {
                    power.validate("drop_weapon")?;
                }
                if let Some(power) = &p.pickup_weapon {
                    power.validate("pickup_weapon")?;
                }
                for power in &p.unarmed_powers {
                    power.validate("unarmed_powers")?;
                }
                Ok(())
            }
            ProfilePrototype::HideAndShoot(p) => {
                p.move_to.validate()?;
                p.hide_power.validate("hide_power")?;
                p.shoot_power.validate("shoot_power")?;
                p.unhide_power.validate("unhide_power")?;
                p.recover.validate()?;
                if p.num_shots == 0 {
                    return Err(ConfigError::ZeroCount { field: "num_shots" });
                }
                Ok(())
            }
            ProfilePrototype::Scavenger(p) => p.move_to.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerRef;

    #[test]
    fn power_context_without_power_is_rejected() {
        let profile = ProfilePrototype::Melee(MeleeProfile {
            base: ProfileBase {
                powers: vec![UsePowerContext::default()],
                ..ProfileBase::default()
            },
            ..MeleeProfile::default()
        });
        let err = profile.validate().unwrap_err();
        assert_eq!(err.error_code(), "missing_power");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }

    #[test]
    fn inverted_cooldown_is_rejected() {
        let power = UsePowerContext {
            cooldown_min_ms: 500,
            cooldown_max_ms: 100,
            ..UsePowerContext::with_power(PowerRef(1))
        };
        assert!(matches!(
            power.validate("powers"),
            Err(ConfigError::InvertedRange { field: "cooldown", .. })
        ));
    }

    #[test]
    fn multishot_requires_shots() {
        let profile = ProfilePrototype::Multishot(MultishotProfile {
            multishot_power: UsePowerContext::with_power(PowerRef(2)),
            num_shots: 0,
            ..MultishotProfile::default()
        });
        assert_eq!(
            profile.validate(),
            Err(ConfigError::ZeroCount { field: "num_shots" })
        );
    }

    #[test]
    fn phases_must_descend() {
        let profile = ProfilePrototype::PhaseBoss(PhaseBossProfile {
            phases: vec![
                BossPhase {
                    health_threshold_pct: 50.0,
                    ..BossPhase::default()
                },
                BossPhase {
                    health_threshold_pct: 75.0,
                    ..BossPhase::default()
                },
            ],
            ..PhaseBossProfile::default()
        });
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::PhaseOrder { index: 1, .. })
        ));
    }

    #[test]
    fn weapon_swap_without_drop_context_is_valid() {
        let profile = ProfilePrototype::WeaponSwap(WeaponSwapProfile::default());
        assert!(profile.validate().is_ok());
        assert_eq!(profile.as_ref(), "WeaponSwap");
    }
}
