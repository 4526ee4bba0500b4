//! Validated profile catalog.

use std::collections::BTreeMap;

use ai_core::prototypes::{ConfigError, ProfilePrototype};
use ai_core::{AiError, ErrorSeverity, ProfileOracle, ProfileRef};

/// One catalog record: a stable id, a human-readable name and the profile.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProfileEntry {
    pub id: ProfileRef,
    pub name: String,
    pub profile: ProfilePrototype,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate profile id {id} ({name})")]
    DuplicateId { id: ProfileRef, name: String },

    #[error("duplicate profile name {name}")]
    DuplicateName { name: String },

    #[error("profile {name} references missing override {missing}")]
    DanglingOverride { name: String, missing: ProfileRef },

    #[error("profile {name} is invalid: {source}")]
    Invalid {
        name: String,
        #[source]
        source: ConfigError,
    },
}

impl AiError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateId { .. } => "duplicate_id",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::DanglingOverride { .. } => "dangling_override",
            Self::Invalid { source, .. } => source.error_code(),
        }
    }
}

/// Read-only profile lookup by reference or name.
#[derive(Clone, Debug, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<ProfileRef, ProfileEntry>,
}

impl ProfileRegistry {
    /// Builds a registry, validating every profile and cross-reference.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate, dangling override or invalid profile.
    pub fn from_entries(entries: Vec<ProfileEntry>) -> Result<Self, RegistryError> {
        let mut profiles = BTreeMap::new();
        for entry in entries {
            if profiles.values().any(|e: &ProfileEntry| e.name == entry.name) {
                return Err(RegistryError::DuplicateName { name: entry.name });
            }
            entry
                .profile
                .validate()
                .map_err(|source| RegistryError::Invalid {
                    name: entry.name.clone(),
                    source,
                })?;
            if profiles.contains_key(&entry.id) {
                return Err(RegistryError::DuplicateId {
                    id: entry.id,
                    name: entry.name,
                });
            }
            profiles.insert(entry.id, entry);
        }

        for entry in profiles.values() {
            if let Some(missing) = entry.profile.base().no_target_override
                && !profiles.contains_key(&missing)
            {
                return Err(RegistryError::DanglingOverride {
                    name: entry.name.clone(),
                    missing,
                });
            }
        }

        tracing::debug!(count = profiles.len(), "profile registry built");
        Ok(Self { profiles })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, id: ProfileRef) -> Option<&ProfileEntry> {
        self.profiles.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<ProfileRef> {
        self.profiles
            .values()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ProfileEntry> {
        self.profiles.values()
    }
}

impl ProfileOracle for ProfileRegistry {
    fn profile(&self, profile: ProfileRef) -> Option<&ProfilePrototype> {
        self.profiles.get(&profile).map(|entry| &entry.profile)
    }
}
