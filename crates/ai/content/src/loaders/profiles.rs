//! Profile catalog loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::registry::{ProfileEntry, ProfileRegistry};

/// Loader for profile catalogs from RON files.
///
/// The file holds a list of [`ProfileEntry`] records:
///
/// ```text
/// [
///     (id: ProfileRef(1), name: "grunt", profile: Melee((base: (...), move_to: (...)))),
///     (id: ProfileRef(2), name: "idle_wander", profile: Wander((wander: (...)))),
/// ]
/// ```
pub struct ProfileLoader;

impl ProfileLoader {
    /// Load and validate a profile catalog.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the RON file containing a list of ProfileEntry
    ///
    /// # Returns
    ///
    /// Returns a ProfileRegistry usable as the engine's ProfileOracle.
    pub fn load(path: &Path) -> LoadResult<ProfileRegistry> {
        let content = read_file(path)?;
        Self::parse(&content).map_err(|e| e.context(format!("in {}", path.display())))
    }

    /// Parse a catalog from RON text.
    pub fn parse(content: &str) -> LoadResult<ProfileRegistry> {
        let entries: Vec<ProfileEntry> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse profile catalog RON: {}", e))?;
        let registry = ProfileRegistry::from_entries(entries)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_core::{ProfileOracle, ProfilePrototype, ProfileRef};
    use tempfile::TempDir;

    const CATALOG: &str = r#"[
        (
            id: ProfileRef(1),
            name: "grunt",
            profile: Melee((
                base: (
                    no_target_override: Some(ProfileRef(2)),
                    attack_rate_min_ms: 500,
                    attack_rate_max_ms: 900,
                    powers: [(power: Some(PowerRef(10)), cooldown_min_ms: 1000, cooldown_max_ms: 2000)],
                ),
                move_to: (range: 30.0),
                orbit: Some((angle_degrees: 30.0)),
            )),
        ),
        (
            id: ProfileRef(2),
            name: "idle_wander",
            profile: Wander((wander: (base: SpawnPoint, radius_min: 20.0, radius_max: 80.0))),
        ),
    ]"#;

    #[test]
    fn loads_catalog_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.ron");
        std::fs::write(&path, CATALOG).unwrap();

        let registry = ProfileLoader::load(&path).unwrap();
        assert_eq!(registry.len(), 2);
        let Some(ProfilePrototype::Melee(grunt)) = registry.profile(ProfileRef(1)) else {
            panic!("grunt should be a melee profile");
        };
        assert_eq!(grunt.base.powers.len(), 1);
        assert_eq!(grunt.move_to.range, 30.0);
        assert!(grunt.move_to.stop_on_arrival);
        assert_eq!(registry.by_name("idle_wander"), Some(ProfileRef(2)));
    }

    #[test]
    fn validation_errors_surface_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ron");
        std::fs::write(
            &path,
            r#"[(id: ProfileRef(1), name: "bad", profile: Melee((base: (powers: [(pick_weight: 2)]))))]"#,
        )
        .unwrap();

        let err = ProfileLoader::load(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("bad.ron"));
        assert!(message.contains("no power"));
    }
}
