//! Run a scenario and print the decision digest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ai_content::{ConfigLoader, ProfileLoader, ScenarioLoader};
use ai_core::AiConfig;

use crate::replay::Replay;

/// Environment variable overriding the scenario seed.
const SEED_ENV: &str = "AI_SIM_SEED";

/// Run a scenario
#[derive(Parser)]
pub struct Run {
    /// Profile catalog (RON)
    #[arg(short, long, value_name = "FILE")]
    profiles: PathBuf,

    /// Scenario to replay (RON)
    #[arg(short, long, value_name = "FILE")]
    scenario: PathBuf,

    /// Engine configuration (TOML); defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed override; takes precedence over AI_SIM_SEED and the scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to run instead of the scenario's own count
    #[arg(long)]
    ticks: Option<u32>,

    /// Print every world command, not just the digest
    #[arg(short, long)]
    verbose: bool,
}

fn env_seed() -> Result<Option<u64>> {
    match std::env::var(SEED_ENV) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{SEED_ENV} is not a number: {raw:?}")),
        Err(_) => Ok(None),
    }
}

impl Run {
    pub fn execute(self) -> Result<()> {
        let registry = ProfileLoader::load(&self.profiles)?;
        let mut scenario = ScenarioLoader::load(&self.scenario)?;
        let config = match &self.config {
            Some(path) => ConfigLoader::load(path)?,
            None => AiConfig::default(),
        };

        if let Some(seed) = self.seed.or(env_seed()?) {
            scenario.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            scenario.ticks = ticks;
        }
        tracing::info!(
            seed = scenario.seed,
            ticks = scenario.ticks,
            agents = scenario.entities.iter().filter(|e| e.profile.is_some()).count(),
            "starting replay"
        );

        let mut replay = Replay::new(scenario, registry, config)?;
        replay.run();

        if self.verbose {
            for line in replay.log_lines() {
                println!("{line}");
            }
        }
        println!("commands: {}", replay.command_count());
        println!("digest:   {}", replay.digest());
        Ok(())
    }
}
