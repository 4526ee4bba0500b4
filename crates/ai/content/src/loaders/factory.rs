//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use ai_core::AiConfig;

use crate::loaders::{ConfigLoader, LoadResult, ProfileLoader, Scenario, ScenarioLoader};
use crate::registry::ProfileRegistry;

/// Content factory that loads AI content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional)
/// ├── profiles.ron
/// └── scenario.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load engine configuration from `config.toml`, falling back to the
    /// defaults when the file does not exist.
    pub fn load_config(&self) -> LoadResult<AiConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(AiConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the profile catalog from `profiles.ron`.
    pub fn load_profiles(&self) -> LoadResult<ProfileRegistry> {
        ProfileLoader::load(&self.data_dir.join("profiles.ron"))
    }

    /// Load the replay scenario from `scenario.ron`.
    pub fn load_scenario(&self) -> LoadResult<Scenario> {
        ScenarioLoader::load(&self.data_dir.join("scenario.ron"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), AiConfig::default());
        assert!(factory.load_profiles().is_err());
    }
}
