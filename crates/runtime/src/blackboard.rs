//! Per-agent blackboard.
//!
//! A typed property store (absent keys read as zero) plus the handful of
//! positions movement contexts share. Exclusively owned by one controller
//! and wiped on despawn.

use std::ops::{Deref, DerefMut};

use ai_core::{PowerRef, PropertyCollection, PropertyId, PropertyKind, Timestamp, Vector3};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Blackboard {
    properties: PropertyCollection,
    pub spawn_point: Option<Vector3>,
    pub despawn_point: Option<Vector3>,
    /// Current waypoint of the active movement context.
    pub state_waypoint: Option<Vector3>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn properties(&self) -> &PropertyCollection {
        &self.properties
    }

    /// Earliest time `power` may be used again.
    pub fn power_cooldown(&self, power: PowerRef) -> Timestamp {
        self.properties.get_time(Self::cooldown_id(power))
    }

    pub fn set_power_cooldown(&mut self, power: PowerRef, until: Timestamp) {
        self.properties.set_time(Self::cooldown_id(power), until);
    }

    pub fn remove_power_cooldown(&mut self, power: PowerRef) {
        self.properties.remove(Self::cooldown_id(power));
    }

    pub fn power_ref(&self, kind: PropertyKind) -> Option<PowerRef> {
        self.properties
            .has(kind)
            .then(|| PowerRef(self.properties.get_int(kind) as u32))
    }

    pub fn set_power_ref(&mut self, kind: PropertyKind, power: PowerRef) {
        self.properties.set_int(kind, i64::from(power.0));
    }

    /// Drops every property and position.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn cooldown_id(power: PowerRef) -> PropertyId {
        PropertyId::with_param(PropertyKind::AIProceduralPowerCooldown, power.0)
    }
}

impl Deref for Blackboard {
    type Target = PropertyCollection;

    fn deref(&self) -> &PropertyCollection {
        &self.properties
    }
}

impl DerefMut for Blackboard {
    fn deref_mut(&mut self) -> &mut PropertyCollection {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldowns_are_per_power() {
        let mut bb = Blackboard::new();
        bb.set_power_cooldown(PowerRef(1), Timestamp(500));
        assert_eq!(bb.power_cooldown(PowerRef(1)), Timestamp(500));
        assert_eq!(bb.power_cooldown(PowerRef(2)), Timestamp::ZERO);
        bb.remove_power_cooldown(PowerRef(1));
        assert!(bb.is_empty());
    }

    #[test]
    fn power_refs_round_trip_through_ints() {
        let mut bb = Blackboard::new();
        assert_eq!(bb.power_ref(PropertyKind::AIActivePower), None);
        bb.set_power_ref(PropertyKind::AIActivePower, PowerRef(42));
        assert_eq!(bb.power_ref(PropertyKind::AIActivePower), Some(PowerRef(42)));
    }

    #[test]
    fn reset_clears_positions() {
        let mut bb = Blackboard::new();
        bb.spawn_point = Some(Vector3::flat(1.0, 2.0));
        bb.adjust(PropertyKind::AIMultishotCount, 2);
        bb.reset();
        assert_eq!(bb, Blackboard::default());
    }
}
