//! Engine configuration loader.

use std::path::Path;

use ai_core::AiConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML file containing AiConfig
    ///
    /// # Returns
    ///
    /// Returns an AiConfig; missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<AiConfig> {
        let content = read_file(path)?;
        let config: AiConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sense_interval_ms = 250\nlos_failure_tolerance = 5\n").unwrap();

        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.sense_interval_ms, 250);
        assert_eq!(config.los_failure_tolerance, 5);
        assert_eq!(config.default_aggro_range, AiConfig::DEFAULT_AGGRO_RANGE);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ConfigLoader::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
