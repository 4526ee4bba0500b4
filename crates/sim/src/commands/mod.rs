//! Command implementations for the replay harness.

mod check;
mod run;

pub use check::Check;
pub use run::Run;
