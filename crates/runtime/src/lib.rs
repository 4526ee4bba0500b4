//! Procedural AI decision engine.
//!
//! One [`AiController`] per agent runs its behavior profile once per tick.
//! A think is a synchronous, non-blocking decision: sense, try a power,
//! then move. Long-running work is expressed through context handlers that
//! report [`Status::Running`] and are resumed on later thinks.
//!
//! Modules are organized by responsibility:
//! - [`controller`] owns per-agent state and the think entry point
//! - [`profiles`] holds the behavior catalog and its shared building blocks
//! - [`contexts`] provides the primitive actions profiles compose
//! - [`procedural`] tracks active contexts, substates and overrides
//! - [`picker`] chooses which power to use next
//! - [`senses`] and [`selector`] find and keep targets
//! - [`blackboard`] is the per-agent memory
pub mod blackboard;
pub mod contexts;
pub mod controller;
pub mod errors;
pub mod picker;
pub mod procedural;
pub mod profiles;
pub mod selector;
pub mod senses;
pub mod think;

#[cfg(test)]
mod testing;

pub use blackboard::Blackboard;
pub use contexts::{ContextHandler, ContextKind, Status};
pub use controller::{AiController, AiEnv, Interrupt};
pub use errors::{Result, RuntimeError};
pub use picker::{PowerPicker, handle_procedural_power, use_power_direct};
pub use procedural::{OverrideType, ProceduralAi};
pub use profiles::Profile;
pub use senses::Senses;
pub use think::ThinkContext;
