//! Replay harness for the decision engine.
//!
//! Loads a profile catalog and a scenario, runs the scenario in the sandbox
//! world with a fixed seed and prints a digest of every world command the
//! agents issued. Two runs with the same inputs print the same digest.
//!
//! ```bash
//! ai-sim run --profiles crates/sim/data/profiles.ron --scenario crates/sim/data/scenario.ron
//! ai-sim check --profiles crates/sim/data/profiles.ron
//! ```

mod commands;
mod replay;

use anyhow::Result;
use clap::Parser;
use commands::{Check, Run};

/// Decision engine replay harness
#[derive(Parser)]
#[command(name = "ai-sim")]
#[command(about = "Deterministic replays of AI profiles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scenario and print its decision digest
    Run(Run),

    /// Validate a profile catalog
    Check(Check),
}

fn main() -> Result<()> {
    // Load .env file if it exists (for AI_SIM_SEED and RUST_LOG)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(cmd) => cmd.execute(),
        Command::Check(cmd) => cmd.execute(),
    }
}
