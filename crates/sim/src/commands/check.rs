//! Validate a profile catalog without running anything.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use ai_content::ProfileLoader;

/// Validate a profile catalog
#[derive(Parser)]
pub struct Check {
    /// Profile catalog (RON)
    #[arg(short, long, value_name = "FILE")]
    profiles: PathBuf,
}

impl Check {
    pub fn execute(self) -> Result<()> {
        let registry = ProfileLoader::load(&self.profiles)?;
        println!("{} profiles OK", registry.len());
        for entry in registry.entries() {
            let kind: &str = entry.profile.as_ref();
            println!("  {:>4}  {:<24} {}", entry.id.0, entry.name, kind);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bundled_catalog_passes() {
        let check = Check {
            profiles: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data/profiles.ron")),
        };
        assert!(check.execute().is_ok());
    }

    #[test]
    fn dangling_override_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.ron");
        std::fs::write(
            &path,
            r#"[(id: ProfileRef(1), name: "lost", profile: Melee((base: (no_target_override: Some(ProfileRef(9))))))]"#,
        )
        .unwrap();

        let err = Check { profiles: path }.execute().unwrap_err();
        assert!(format!("{err:#}").contains("missing override"));
    }
}
