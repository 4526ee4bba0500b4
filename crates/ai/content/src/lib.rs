//! Data-driven profile catalogs and loaders.
//!
//! This crate turns RON/TOML data files into the read-only inputs of the
//! decision engine:
//! - Behavior profile catalogs (RON) into a validated [`ProfileRegistry`]
//! - Engine configuration (TOML) into [`ai_core::AiConfig`]
//! - Replay scenarios (RON) for the simulation harness
//!
//! Content is consumed through [`ai_core::ProfileOracle`] and never appears
//! in per-agent state.

pub mod registry;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use registry::{ProfileEntry, ProfileRegistry, RegistryError};

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentFactory, ProfileLoader, Scenario, ScenarioEntity, ScenarioEvent,
    ScenarioEventKind, ScenarioLoader,
};
