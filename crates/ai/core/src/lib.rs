//! Shared vocabulary of the procedural AI decision engine.
//!
//! `ai-core` defines identifiers and math, the deterministic random source,
//! the typed property store backing blackboards, the capability traits the
//! engine drives the host world through, and the prototype records profiles
//! are configured with. Decision logic lives in `ai-runtime`; loading lives
//! in `ai-content`.
pub mod config;
pub mod error;
pub mod properties;
pub mod prototypes;
pub mod rng;
pub mod sandbox;
pub mod types;
pub mod world;

pub use config::AiConfig;
pub use error::{AiError, ErrorSeverity};
pub use properties::{PropertyCollection, PropertyId, PropertyKind, PropertyType, PropertyValue};
pub use prototypes::{ConfigError, ProfilePrototype};
pub use rng::{GameRandom, compute_seed};
pub use types::{
    DifficultyRange, DifficultyTier, EntityId, Health, KeywordId, PowerRef, ProfileRef,
    PrototypeId, RegionId, Timestamp, Vector3,
};
pub use world::{
    Combat, CombatTargetFlags, CombatTargetType, EntityWorld, Locomotion, PathResult,
    PowerUseResult, Powers, ProfileOracle, Simulation, SpawnerAction,
};
