//! Identifiers, time and 2D/3D math shared by every layer.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Unique identifier for any entity tracked by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u64);

impl EntityId {
    /// Raw id `0` never names a live entity.
    pub const INVALID: Self = Self(0);

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to a power prototype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerRef(pub u32);

impl fmt::Display for PowerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "power:{}", self.0)
    }
}

/// Reference to a behavior profile prototype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileRef(pub u32);

impl fmt::Display for ProfileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile:{}", self.0)
    }
}

/// Reference to an entity prototype (archetype), used by selection filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrototypeId(pub u32);

/// Gameplay keyword attached to entities (e.g. "Weapon", "Crate").
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeywordId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionId(pub u32);

/// Absolute simulation time in milliseconds.
///
/// The AI never reads wall-clock time; every deadline is compared against
/// the game clock supplied by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn plus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds from `self` until `later`, zero if `later` already passed.
    pub const fn millis_until(self, later: Timestamp) -> u64 {
        later.0.saturating_sub(self.0)
    }
}

impl Add<u64> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: u64) -> Timestamp {
        self.plus_millis(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// World-space vector. The decision layer works on the XY plane; Z is
/// carried through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn flat(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Unit vector on the XY plane pointing along `yaw` (radians).
    pub fn from_yaw(yaw: f32) -> Self {
        Self::flat(yaw.cos(), yaw.sin())
    }

    /// Squared distance on the XY plane. All range checks use this to avoid
    /// square roots.
    #[inline]
    pub fn distance_2d_sq(self, other: Vector3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance_2d(self, other: Vector3) -> f32 {
        self.distance_2d_sq(other).sqrt()
    }

    pub fn length_2d_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Normalized XY direction, or `None` for a (near) zero vector.
    pub fn normalize_2d(self) -> Option<Vector3> {
        let len_sq = self.length_2d_sq();
        if len_sq <= f32::EPSILON {
            return None;
        }
        let inv = len_sq.sqrt().recip();
        Some(Self::flat(self.x * inv, self.y * inv))
    }

    /// Rotates the XY components counterclockwise by `radians`.
    #[must_use]
    pub fn rotate_2d(self, radians: f32) -> Vector3 {
        let (sin, cos) = radians.sin_cos();
        Self::new(
            self.x * cos - self.y * sin,
            self.x * sin + self.y * cos,
            self.z,
        )
    }

    /// Yaw angle (radians) of the XY components.
    pub fn yaw(self) -> f32 {
        self.y.atan2(self.x)
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f32) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

/// Current and maximum health of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub const fn new(current: f32, maximum: f32) -> Self {
        Self { current, maximum }
    }

    /// Health as a 0-100 percentage; entities without max health count as full.
    pub fn percent(self) -> f32 {
        if self.maximum <= 0.0 {
            return 100.0;
        }
        (self.current / self.maximum * 100.0).clamp(0.0, 100.0)
    }
}

/// Difficulty tier of the region an agent lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyTier(pub u8);

/// Inclusive band of difficulty tiers a power is allowed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DifficultyRange {
    pub min: DifficultyTier,
    pub max: DifficultyTier,
}

impl DifficultyRange {
    pub fn contains(&self, tier: DifficultyTier) -> bool {
        tier >= self.min && tier <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_ignores_z() {
        let a = Vector3::new(0.0, 0.0, 100.0);
        let b = Vector3::new(3.0, 4.0, -50.0);
        assert_eq!(a.distance_2d_sq(b), 25.0);
        assert_eq!(a.distance_2d(b), 5.0);
    }

    #[test]
    fn rotate_quarter_turn() {
        let v = Vector3::flat(1.0, 0.0).rotate_2d(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn normalize_zero_is_none() {
        assert!(Vector3::ZERO.normalize_2d().is_none());
    }

    #[test]
    fn timestamp_saturates() {
        assert_eq!(Timestamp(u64::MAX).plus_millis(5), Timestamp(u64::MAX));
        assert_eq!(Timestamp(10).millis_until(Timestamp(4)), 0);
    }

    #[test]
    fn health_percent_without_max_is_full() {
        assert_eq!(Health::new(5.0, 0.0).percent(), 100.0);
        assert_eq!(Health::new(25.0, 50.0).percent(), 50.0);
    }
}
