//! Typed property store used for blackboards and agent properties.
//!
//! A property is addressed by a [`PropertyId`]: a [`PropertyKind`] plus an
//! optional integer parameter (e.g. the power a cooldown belongs to). Every
//! kind declares the type of value it holds; reading an absent property
//! yields that type's zero value, so callers never branch on presence unless
//! they explicitly ask with [`PropertyCollection::has`].

use std::collections::BTreeMap;

use crate::types::{EntityId, Timestamp};

/// Value type declared by a [`PropertyKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Int,
    Float,
    Time,
    Entity,
}

/// Known property kinds.
///
/// `AICustom*` slots are deliberately generic: each profile assigns its own
/// meaning to them, and different profiles reuse the same slots.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyKind {
    // ----- targeting -----
    AITargetId,
    AIAssistedEntityId,
    AIInteractEntityId,
    AIPreviousTargetId,
    AICustomEntityVal1,

    // ----- cadence and cooldowns -----
    AINextAttackTime,
    /// Parameter: power reference.
    AIProceduralPowerCooldown,
    AIProceduralNextFlankTime,
    AISyncAttackPower,

    // ----- context bookkeeping -----
    AIActivePower,
    AIActiveAffixPower,
    AITargetSwitchPermanent,
    AIFlankTimeout,
    AIFleeEndTime,
    AIDelayEndTime,
    AIRotateGoalYaw,
    AIOrbitDirection,
    AIPathFailureCount,
    AILosFailureCount,
    AIPathNodeIndex,

    // ----- profile state -----
    AIProfileInitialized,
    AIIgnoreNoTgtOverrideProfile,
    AIEnrageState,
    AIMultishotCount,
    AICustomStateVal1,
    AICustomStateVal2,
    AICustomTimeVal1,
    AICustomTimeVal2,

    // ----- agent properties -----
    EnrageStartTime,
    Threat,
    Level,
}

impl PropertyKind {
    /// Value type stored under this kind.
    pub const fn value_type(self) -> PropertyType {
        use PropertyKind::*;
        match self {
            AITargetId | AIAssistedEntityId | AIInteractEntityId | AIPreviousTargetId
            | AICustomEntityVal1 => PropertyType::Entity,

            AINextAttackTime | AIProceduralPowerCooldown | AIProceduralNextFlankTime
            | AIFlankTimeout | AIFleeEndTime | AIDelayEndTime | AICustomTimeVal1
            | AICustomTimeVal2 | EnrageStartTime => PropertyType::Time,

            AIRotateGoalYaw | Threat => PropertyType::Float,

            AISyncAttackPower | AIActivePower | AIActiveAffixPower | AITargetSwitchPermanent
            | AIOrbitDirection | AIPathFailureCount | AILosFailureCount | AIPathNodeIndex
            | AIProfileInitialized | AIIgnoreNoTgtOverrideProfile | AIEnrageState | AIMultishotCount
            | AICustomStateVal1 | AICustomStateVal2 | Level => PropertyType::Int,
        }
    }
}

/// Property address: kind plus optional discriminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyId {
    pub kind: PropertyKind,
    pub param: Option<u32>,
}

impl PropertyId {
    pub const fn new(kind: PropertyKind) -> Self {
        Self { kind, param: None }
    }

    pub const fn with_param(kind: PropertyKind, param: u32) -> Self {
        Self {
            kind,
            param: Some(param),
        }
    }
}

impl From<PropertyKind> for PropertyId {
    fn from(kind: PropertyKind) -> Self {
        Self::new(kind)
    }
}

/// Tagged property value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyValue {
    Int(i64),
    Float(f32),
    Time(Timestamp),
    Entity(EntityId),
}

impl PropertyValue {
    /// Zero value of a property type.
    pub const fn zero(ty: PropertyType) -> Self {
        match ty {
            PropertyType::Int => PropertyValue::Int(0),
            PropertyType::Float => PropertyValue::Float(0.0),
            PropertyType::Time => PropertyValue::Time(Timestamp::ZERO),
            PropertyType::Entity => PropertyValue::Entity(EntityId::INVALID),
        }
    }

    pub const fn value_type(&self) -> PropertyType {
        match self {
            PropertyValue::Int(_) => PropertyType::Int,
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Time(_) => PropertyType::Time,
            PropertyValue::Entity(_) => PropertyType::Entity,
        }
    }

    pub fn as_int(&self) -> i64 {
        match *self {
            PropertyValue::Int(v) => v,
            PropertyValue::Float(v) => v as i64,
            PropertyValue::Time(t) => t.0 as i64,
            PropertyValue::Entity(e) => e.0 as i64,
        }
    }

    pub fn as_float(&self) -> f32 {
        match *self {
            PropertyValue::Int(v) => v as f32,
            PropertyValue::Float(v) => v,
            PropertyValue::Time(t) => t.0 as f32,
            PropertyValue::Entity(e) => e.0 as f32,
        }
    }
}

/// Ordered map of typed properties with "absent reads as zero" semantics.
///
/// Backed by a `BTreeMap` so iteration (and therefore any serialized form or
/// debug dump) is deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyCollection {
    values: BTreeMap<PropertyId, PropertyValue>,
}

impl PropertyCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn has(&self, id: impl Into<PropertyId>) -> bool {
        self.values.contains_key(&id.into())
    }

    /// Reads a property, falling back to the kind's zero value.
    pub fn get(&self, id: impl Into<PropertyId>) -> PropertyValue {
        let id = id.into();
        self.values
            .get(&id)
            .copied()
            .unwrap_or(PropertyValue::zero(id.kind.value_type()))
    }

    pub fn get_int(&self, id: impl Into<PropertyId>) -> i64 {
        self.get(id).as_int()
    }

    pub fn get_float(&self, id: impl Into<PropertyId>) -> f32 {
        self.get(id).as_float()
    }

    pub fn get_bool(&self, id: impl Into<PropertyId>) -> bool {
        self.get_int(id) != 0
    }

    pub fn get_time(&self, id: impl Into<PropertyId>) -> Timestamp {
        match self.get(id) {
            PropertyValue::Time(t) => t,
            other => Timestamp(other.as_int().max(0) as u64),
        }
    }

    /// Entity reference, `None` when absent or invalid.
    pub fn get_entity(&self, id: impl Into<PropertyId>) -> Option<EntityId> {
        let entity = match self.get(id) {
            PropertyValue::Entity(e) => e,
            other => EntityId(other.as_int().max(0) as u64),
        };
        entity.is_valid().then_some(entity)
    }

    /// Stores a value, converting it to the type the kind declares.
    pub fn set(&mut self, id: impl Into<PropertyId>, value: PropertyValue) {
        let id = id.into();
        let declared = id.kind.value_type();
        let value = if value.value_type() == declared {
            value
        } else {
            tracing::trace!(
                property = %id.kind,
                ?value,
                ?declared,
                "coercing property value to declared type"
            );
            coerce(value, declared)
        };
        self.values.insert(id, value);
    }

    pub fn set_int(&mut self, id: impl Into<PropertyId>, value: i64) {
        self.set(id, PropertyValue::Int(value));
    }

    pub fn set_float(&mut self, id: impl Into<PropertyId>, value: f32) {
        self.set(id, PropertyValue::Float(value));
    }

    pub fn set_bool(&mut self, id: impl Into<PropertyId>, value: bool) {
        self.set(id, PropertyValue::Int(value as i64));
    }

    pub fn set_time(&mut self, id: impl Into<PropertyId>, value: Timestamp) {
        self.set(id, PropertyValue::Time(value));
    }

    /// Stores an entity reference; `None` removes the property.
    pub fn set_entity(&mut self, id: impl Into<PropertyId>, value: Option<EntityId>) {
        match value {
            Some(entity) if entity.is_valid() => self.set(id, PropertyValue::Entity(entity)),
            _ => {
                self.remove(id);
            }
        }
    }

    /// Numeric accumulate. Returns the new value.
    pub fn adjust(&mut self, id: impl Into<PropertyId>, delta: i64) -> i64 {
        let id = id.into();
        let value = self.get_int(id).saturating_add(delta);
        self.set_int(id, value);
        value
    }

    pub fn adjust_float(&mut self, id: impl Into<PropertyId>, delta: f32) -> f32 {
        let id = id.into();
        let value = self.get_float(id) + delta;
        self.set_float(id, value);
        value
    }

    pub fn remove(&mut self, id: impl Into<PropertyId>) -> Option<PropertyValue> {
        self.values.remove(&id.into())
    }

    /// Removes every property of `kind`, regardless of parameter.
    pub fn remove_kind(&mut self, kind: PropertyKind) {
        self.values.retain(|id, _| id.kind != kind);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyId, &PropertyValue)> {
        self.values.iter()
    }
}

fn coerce(value: PropertyValue, ty: PropertyType) -> PropertyValue {
    match ty {
        PropertyType::Int => PropertyValue::Int(value.as_int()),
        PropertyType::Float => PropertyValue::Float(value.as_float()),
        PropertyType::Time => PropertyValue::Time(Timestamp(value.as_int().max(0) as u64)),
        PropertyType::Entity => PropertyValue::Entity(EntityId(value.as_int().max(0) as u64)),
    }
}
