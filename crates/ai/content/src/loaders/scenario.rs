//! Replay scenario loader.
//!
//! A scenario describes a small deterministic world: who is where, which
//! profile drives each agent, and scripted events that happen at fixed
//! ticks. The simulation harness turns it into a sandbox world.

use std::path::Path;

use ai_core::sandbox::SandboxPower;
use ai_core::{KeywordId, PrototypeId, Vector3};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioEntity {
    /// Unique within the scenario; events and `assisted` refer to it.
    pub name: String,
    pub position: Vector3,
    pub faction: u32,
    pub avatar: bool,
    pub ranged: bool,
    pub health: Option<f32>,
    pub speed: Option<f32>,
    pub bounds: f32,
    pub keywords: Vec<KeywordId>,
    pub prototype: Option<PrototypeId>,
    pub spawner: bool,
    pub stationary: bool,
    pub path_blocked: bool,
    pub powers: Vec<SandboxPower>,
    pub affix_powers: Vec<SandboxPower>,
    /// Name of the profile driving this entity; `None` for inert entities.
    pub profile: Option<String>,
    /// Master for ally profiles.
    pub assisted: Option<String>,
}

impl Default for ScenarioEntity {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vector3::ZERO,
            faction: 0,
            avatar: false,
            ranged: false,
            health: None,
            speed: None,
            bounds: 0.0,
            keywords: Vec::new(),
            prototype: None,
            spawner: false,
            stationary: false,
            path_blocked: false,
            powers: Vec::new(),
            affix_powers: Vec::new(),
            profile: None,
            assisted: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioEventKind {
    Damage {
        attacker: String,
        victim: String,
        amount: f32,
    },
    Kill(String),
    Teleport {
        entity: String,
        position: Vector3,
    },
    /// Wakes the named agent up.
    Alert(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEvent {
    pub tick: u32,
    pub kind: ScenarioEventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub seed: u64,
    pub tick_ms: u64,
    pub ticks: u32,
    pub difficulty: u8,
    pub entities: Vec<ScenarioEntity>,
    pub events: Vec<ScenarioEvent>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_ms: 100,
            ticks: 100,
            difficulty: 0,
            entities: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl Scenario {
    pub fn entity(&self, name: &str) -> Option<&ScenarioEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Checks that names are unique and every reference resolves.
    pub fn validate(&self) -> LoadResult<()> {
        for (index, entity) in self.entities.iter().enumerate() {
            if self.entities[..index].iter().any(|e| e.name == entity.name) {
                anyhow::bail!("duplicate scenario entity name {:?}", entity.name);
            }
            if let Some(master) = &entity.assisted
                && self.entity(master).is_none()
            {
                anyhow::bail!("{} assists unknown entity {:?}", entity.name, master);
            }
        }
        for event in &self.events {
            let names: Vec<&str> = match &event.kind {
                ScenarioEventKind::Damage {
                    attacker, victim, ..
                } => vec![attacker.as_str(), victim.as_str()],
                ScenarioEventKind::Kill(name) | ScenarioEventKind::Alert(name) => vec![name.as_str()],
                ScenarioEventKind::Teleport { entity, .. } => vec![entity.as_str()],
            };
            if let Some(missing) = names.into_iter().find(|n| self.entity(n).is_none()) {
                anyhow::bail!("event at tick {} names unknown entity {:?}", event.tick, missing);
            }
        }
        Ok(())
    }
}

/// Loader for replay scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Load a scenario from a RON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a Scenario
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let scenario: Scenario = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        scenario.validate()?;

        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("scenario.ron");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_entities_and_events() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"(
                seed: 7,
                ticks: 20,
                entities: [
                    (name: "hero", position: (x: 0.0, y: 0.0), avatar: true),
                    (
                        name: "grunt",
                        position: (x: 300.0, y: 0.0),
                        faction: 1,
                        profile: Some("grunt"),
                        powers: [(power: PowerRef(10), range: 30.0, duration_ms: 400)],
                    ),
                ],
                events: [(tick: 5, kind: Damage(attacker: "hero", victim: "grunt", amount: 10.0))],
            )"#,
        );

        let scenario = ScenarioLoader::load(&path).unwrap();
        assert_eq!(scenario.seed, 7);
        assert_eq!(scenario.tick_ms, 100);
        assert_eq!(scenario.entities.len(), 2);
        let grunt = scenario.entity("grunt").unwrap();
        assert_eq!(grunt.powers[0].duration_ms, 400);
        assert_eq!(grunt.powers[0].cooldown_ms, 0);
        assert_eq!(scenario.events.len(), 1);
    }

    #[test]
    fn unknown_event_entity_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"(entities: [(name: "a")], events: [(tick: 1, kind: Kill("b"))])"#,
        );
        let err = ScenarioLoader::load(&path).unwrap_err();
        assert!(err.to_string().contains("unknown entity"));
    }
}
